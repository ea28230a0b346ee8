// SPDX-License-Identifier: Apache-2.0

//! Object and array state machines.
//!
//! Both parsers pull bytes from a [`Context`], hand each field or element to a callback,
//! and leave nested containers to the callback: a nested object or array arrives as a
//! [`Value`] of type `Object`/`Array` whose opening bracket is already consumed, and the
//! callback must call [`parse_object`]/[`parse_array`] (or [`ignore`](crate::ignore)) on
//! the same context before returning.

use crate::context::NestedStatus;
use crate::parse_error::{ErrorReason, ParseError};
use crate::scanner::{is_whitespace, parse_string, parse_unquoted_value};
use crate::value::{Value, ValueType};
use crate::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    OpeningBracket,
    FieldNameOrClosingBracket,
    FieldName,
    Colon,
    FieldValue,
    CommaOrClosingBracket,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    OpeningBracket,
    ValueOrClosingBracket,
    Value,
    CommaOrClosingBracket,
    End,
}

/// Where a container parse starts: the depth it must return to after each callback,
/// and the first byte to look at.
struct Entry {
    level: usize,
    c: Option<u8>,
    must_read: bool,
}

fn enter<C: Context + ?Sized>(ctx: &C) -> Result<Entry, ParseError> {
    let nesting = ctx.nesting();
    let level = nesting.level();
    if level > ctx.nesting_limit() {
        nesting.leave(level);
        return Err(ParseError::at(ctx, ErrorReason::ExceededNestingLimit));
    }
    let pending = match nesting.status() {
        NestedStatus::None => None,
        NestedStatus::Object => Some(b'{'),
        NestedStatus::Array => Some(b'['),
    };
    nesting.reset_status();
    Ok(Entry {
        level,
        c: pending,
        must_read: pending.is_none(),
    })
}

/// Reads the value starting at `c`. Containers are only opened (the child parse takes
/// over); for keywords and numbers the terminating byte is returned as well.
fn read_value<C: Context + ?Sized>(
    ctx: &C,
    c: Option<u8>,
) -> Result<(Value<'_>, Option<u8>), ParseError> {
    let offset = ctx.read_offset().saturating_sub(1);
    match c {
        Some(b'"') => {
            let raw = parse_string(ctx)?;
            Ok((Value::at(ValueType::String, raw, offset), None))
        }
        Some(b'{') => {
            ctx.nesting().begin_nested(NestedStatus::Object);
            Ok((Value::container(ValueType::Object, offset), None))
        }
        Some(b'[') => {
            ctx.nesting().begin_nested(NestedStatus::Array);
            Ok((Value::container(ValueType::Array, offset), None))
        }
        _ => {
            let (value, terminator) = parse_unquoted_value(ctx, c)?;
            Ok((value, Some(terminator)))
        }
    }
}

/// Parses an object, calling `handler(field_name, value)` for every field in order.
///
/// Duplicate names are reported each time they occur. Errors returned by `handler`
/// abort the parse and are passed through unchanged.
///
/// # Example
///
/// ```rust
/// use lazyjson::{parse_array, parse_object, ConstBufferContext, ValueType};
///
/// let ctx = ConstBufferContext::new(br#"{"id": 7, "tags": ["a", "b"]}"#);
/// let mut id = 0u32;
/// let mut tags = Vec::new();
/// parse_object(&ctx, |name, value| {
///     match name {
///         "id" => id = value.to()?,
///         "tags" if value.value_type() == ValueType::Array => {
///             parse_array(&ctx, |tag| {
///                 tags.push(tag.to::<String>()?);
///                 Ok(())
///             })?;
///         }
///         _ => lazyjson::ignore(&ctx)?,
///     }
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(id, 7);
/// assert_eq!(tags, ["a", "b"]);
/// ```
pub fn parse_object<'c, C, F>(ctx: &'c C, mut handler: F) -> Result<(), ParseError>
where
    C: Context + ?Sized,
    F: FnMut(&'c str, Value<'c>) -> Result<(), ParseError>,
{
    let entry = enter(ctx)?;
    let level = entry.level;
    log::trace!("object start, depth {level}");
    let result = object_states(ctx, entry, &mut handler);
    ctx.nesting().leave(level);
    log::trace!("object end, depth {level}");
    result
}

fn object_states<'c, C, F>(ctx: &'c C, entry: Entry, handler: &mut F) -> Result<(), ParseError>
where
    C: Context + ?Sized,
    F: FnMut(&'c str, Value<'c>) -> Result<(), ParseError>,
{
    let Entry {
        level,
        mut c,
        mut must_read,
    } = entry;
    let mut state = ObjectState::OpeningBracket;
    let mut field_name = "";
    while state != ObjectState::End {
        if ctx.nesting().level() != level {
            return Err(ParseError::at(ctx, ErrorReason::NestedObjectOrArrayNotParsed));
        }
        if must_read {
            c = ctx.read();
        }
        must_read = true;
        if c.is_some_and(is_whitespace) {
            continue;
        }

        state = match state {
            ObjectState::OpeningBracket => match c {
                Some(b'{') => ObjectState::FieldNameOrClosingBracket,
                _ => return Err(ParseError::at(ctx, ErrorReason::ExpectedOpeningBracket)),
            },
            ObjectState::FieldNameOrClosingBracket | ObjectState::FieldName => match c {
                Some(b'}') if state == ObjectState::FieldNameOrClosingBracket => {
                    ObjectState::End
                }
                Some(b'"') => {
                    field_name = parse_string(ctx)?;
                    ObjectState::Colon
                }
                _ => return Err(ParseError::at(ctx, ErrorReason::ExpectedOpeningQuote)),
            },
            ObjectState::Colon => match c {
                Some(b':') => ObjectState::FieldValue,
                _ => return Err(ParseError::at(ctx, ErrorReason::ExpectedColon)),
            },
            ObjectState::FieldValue => {
                let (value, terminator) = read_value(ctx, c)?;
                if terminator.is_some() {
                    c = terminator;
                    must_read = false;
                }
                handler(field_name, value)?;
                ObjectState::CommaOrClosingBracket
            }
            ObjectState::CommaOrClosingBracket => match c {
                Some(b',') => ObjectState::FieldName,
                Some(b'}') => ObjectState::End,
                _ => {
                    return Err(ParseError::at(
                        ctx,
                        ErrorReason::ExpectedCommaOrClosingBracket,
                    ))
                }
            },
            ObjectState::End => ObjectState::End,
        };
    }
    Ok(())
}

/// Parses an array, calling `handler(value)` for every element in order.
///
/// # Example
///
/// ```rust
/// use lazyjson::{parse_array, BufferContext};
///
/// let mut json = b"[1.5, -2, 4e1]".to_vec();
/// let ctx = BufferContext::new(&mut json);
/// let mut total = 0.0;
/// parse_array(&ctx, |value| {
///     total += value.to::<f64>()?;
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(total, 39.5);
/// ```
pub fn parse_array<'c, C, F>(ctx: &'c C, mut handler: F) -> Result<(), ParseError>
where
    C: Context + ?Sized,
    F: FnMut(Value<'c>) -> Result<(), ParseError>,
{
    let entry = enter(ctx)?;
    let level = entry.level;
    log::trace!("array start, depth {level}");
    let result = array_states(ctx, entry, &mut handler);
    ctx.nesting().leave(level);
    log::trace!("array end, depth {level}");
    result
}

fn array_states<'c, C, F>(ctx: &'c C, entry: Entry, handler: &mut F) -> Result<(), ParseError>
where
    C: Context + ?Sized,
    F: FnMut(Value<'c>) -> Result<(), ParseError>,
{
    let Entry {
        level,
        mut c,
        mut must_read,
    } = entry;
    let mut state = ArrayState::OpeningBracket;
    while state != ArrayState::End {
        if ctx.nesting().level() != level {
            return Err(ParseError::at(ctx, ErrorReason::NestedObjectOrArrayNotParsed));
        }
        if must_read {
            c = ctx.read();
        }
        must_read = true;
        if c.is_some_and(is_whitespace) {
            continue;
        }

        state = match state {
            ArrayState::OpeningBracket => match c {
                Some(b'[') => ArrayState::ValueOrClosingBracket,
                _ => return Err(ParseError::at(ctx, ErrorReason::ExpectedOpeningBracket)),
            },
            ArrayState::ValueOrClosingBracket if c == Some(b']') => ArrayState::End,
            ArrayState::ValueOrClosingBracket | ArrayState::Value => {
                let (value, terminator) = read_value(ctx, c)?;
                if terminator.is_some() {
                    c = terminator;
                    must_read = false;
                }
                handler(value)?;
                ArrayState::CommaOrClosingBracket
            }
            ArrayState::CommaOrClosingBracket => match c {
                Some(b',') => ArrayState::Value,
                Some(b']') => ArrayState::End,
                _ => {
                    return Err(ParseError::at(
                        ctx,
                        ErrorReason::ExpectedCommaOrClosingBracket,
                    ))
                }
            },
            ArrayState::End => ArrayState::End,
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ignore, ConstBufferContext};
    use alloc::vec::Vec;
    use test_log::test;

    fn reason_of(result: Result<(), ParseError>) -> (ErrorReason, usize) {
        let err = result.unwrap_err();
        (err.reason().clone(), err.offset())
    }

    #[test]
    fn test_flat_object() {
        let ctx = ConstBufferContext::new(br#" { "a" : "x", "b":42,"c" : true , "d":null } "#);
        let mut seen = Vec::new();
        parse_object(&ctx, |name, value| {
            seen.push((name, value.value_type(), value.raw()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            [
                ("a", ValueType::String, "x"),
                ("b", ValueType::Number, "42"),
                ("c", ValueType::Boolean, "true"),
                ("d", ValueType::Null, "null"),
            ]
        );
    }

    #[test]
    fn test_empty_containers() {
        let ctx = ConstBufferContext::new(b"{}");
        parse_object(&ctx, |_, _| panic!("no fields expected")).unwrap();
        let ctx = ConstBufferContext::new(b"[ \n ]");
        parse_array(&ctx, |_| panic!("no elements expected")).unwrap();
    }

    #[test]
    fn test_nested_value_must_be_parsed() {
        let ctx = ConstBufferContext::new(br#"{"a":{"b":1}}"#);
        let result = parse_object(&ctx, |_, _| Ok(()));
        assert_eq!(
            reason_of(result).0,
            ErrorReason::NestedObjectOrArrayNotParsed
        );
    }

    #[test]
    fn test_nested_value_parsed_by_callback() {
        let ctx = ConstBufferContext::new(br#"{"outer":{"inner":[1,[2]]},"after":3}"#);
        let mut after = 0;
        parse_object(&ctx, |name, value| {
            if name == "outer" {
                parse_object(&ctx, |inner, value| {
                    assert_eq!(inner, "inner");
                    assert_eq!(value.value_type(), ValueType::Array);
                    ignore(&ctx)
                })?;
                // the field name is still readable after recursing
                assert_eq!(name, "outer");
            } else {
                after = value.to()?;
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(after, 3);
        assert_eq!(ctx.nesting().level(), 0);
    }

    #[test]
    fn test_wrong_container_kind() {
        let ctx = ConstBufferContext::new(b"[1]");
        assert_eq!(
            reason_of(parse_object(&ctx, |_, _| Ok(()))),
            (ErrorReason::ExpectedOpeningBracket, 0)
        );
        let ctx = ConstBufferContext::new(br#"{"a":{}}"#);
        let result = parse_object(&ctx, |_, _| parse_array(&ctx, |_| Ok(())));
        assert_eq!(reason_of(result), (ErrorReason::ExpectedOpeningBracket, 5));
    }

    #[test]
    fn test_callback_error_passes_through() {
        let ctx = ConstBufferContext::new(br#"[1, "x"]"#);
        let result = parse_array(&ctx, |value| value.to::<u8>().map(|_| ()));
        let err = result.unwrap_err();
        assert_eq!(
            err.reason(),
            &ErrorReason::TypeMismatch {
                found: ValueType::String
            }
        );
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_failed_parse_restores_nesting() {
        let ctx = ConstBufferContext::new(br#"{"a":[{"b":[1 2]}]}"#);
        let result = parse_object(&ctx, |_, _| {
            parse_array(&ctx, |_| parse_object(&ctx, |_, _| parse_array(&ctx, |_| Ok(()))))
        });
        assert_eq!(
            reason_of(result),
            (ErrorReason::ExpectedCommaOrClosingBracket, 14)
        );
        assert_eq!(ctx.nesting().level(), 0);
        assert_eq!(ctx.nesting().status(), NestedStatus::None);
    }

    #[test]
    fn test_unparsed_child_and_limit_errors_restore_nesting() {
        let ctx = ConstBufferContext::new(br#"{"a":{"b":1}}"#);
        assert!(parse_object(&ctx, |_, _| Ok(())).is_err());
        assert_eq!(ctx.nesting().level(), 0);
        assert_eq!(ctx.nesting().status(), NestedStatus::None);

        let ctx = ConstBufferContext::<'_, 1>::with_limit(b"[[[]]]");
        let result = parse_array(&ctx, |_| parse_array(&ctx, |_| parse_array(&ctx, |_| Ok(()))));
        assert_eq!(reason_of(result).0, ErrorReason::ExceededNestingLimit);
        assert_eq!(ctx.nesting().level(), 0);
        assert_eq!(ctx.nesting().status(), NestedStatus::None);
    }

    #[test]
    fn test_context_reuse_for_sequential_documents() {
        let ctx = ConstBufferContext::new(b"[1] [2]");
        let mut values = Vec::new();
        for _ in 0..2 {
            parse_array(&ctx, |value| {
                values.push(value.to::<i32>()?);
                Ok(())
            })
            .unwrap();
        }
        assert_eq!(values, [1, 2]);
    }
}
