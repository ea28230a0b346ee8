// SPDX-License-Identifier: Apache-2.0

//! Token recognition: quoted strings and unquoted literals (keywords and numbers).

use crate::escape_processor::{EscapeProcessor, UnicodeEscapeCollector, UnicodeEscapeError};
use crate::parse_error::{ErrorReason, ParseError};
use crate::value::{Value, ValueType};
use crate::Context;

pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_terminator(byte: u8) -> bool {
    is_whitespace(byte) || matches!(byte, b',' | b'}' | b']')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    Character,
    Escape,
    Unicode,
}

/// Reads a string whose opening quote has already been consumed, decoding escapes into
/// a new literal.
///
/// # Example
///
/// ```rust
/// use lazyjson::{parse_string, ConstBufferContext};
///
/// let ctx = ConstBufferContext::new(br#"caf\u00e9" tail"#);
/// assert_eq!(parse_string(&ctx).unwrap(), "café");
/// ```
pub fn parse_string<C: Context + ?Sized>(ctx: &C) -> Result<&str, ParseError> {
    ctx.begin_literal();
    let mut state = StringState::Character;
    let mut unicode = UnicodeEscapeCollector::new();

    loop {
        let c = ctx
            .read()
            .ok_or_else(|| ParseError::at(ctx, ErrorReason::UnterminatedValue))?;
        match state {
            StringState::Character => match c {
                b'\\' => state = StringState::Escape,
                _ if unicode.has_pending_high_surrogate() => {
                    return Err(ParseError::at(ctx, ErrorReason::ExpectedUtf16LowSurrogate));
                }
                b'"' => break,
                _ => ctx.write(c),
            },
            StringState::Escape => {
                if c == b'u' {
                    unicode.begin();
                    state = StringState::Unicode;
                } else if unicode.has_pending_high_surrogate() {
                    return Err(ParseError::at(ctx, ErrorReason::ExpectedUtf16LowSurrogate));
                } else {
                    let decoded = EscapeProcessor::process_simple_escape(c).ok_or_else(|| {
                        ParseError::at(ctx, ErrorReason::InvalidEscapeSequence)
                    })?;
                    ctx.write(decoded);
                    state = StringState::Character;
                }
            }
            StringState::Unicode => {
                let complete = unicode
                    .add_hex_digit(c)
                    .ok_or_else(|| ParseError::at(ctx, ErrorReason::InvalidEscapeSequence))?;
                if complete {
                    let mut utf8 = [0u8; 4];
                    let bytes = unicode.finish(&mut utf8).map_err(|err| {
                        let reason = match err {
                            UnicodeEscapeError::NullCharacter => ErrorReason::NullUtf16Character,
                            UnicodeEscapeError::Encoding(_) => ErrorReason::InvalidUtf16Character,
                        };
                        ParseError::at(ctx, reason)
                    })?;
                    for &byte in bytes.unwrap_or_default() {
                        ctx.write(byte);
                    }
                    state = StringState::Character;
                }
            }
        }
    }

    core::str::from_utf8(ctx.end_literal())
        .map_err(|_| ParseError::at(ctx, ErrorReason::InvalidUtf8))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    /// After a leading `-`.
    Minus,
    /// Integer part is a single `0`.
    Zero,
    Integer,
    /// After `.`, before the first fraction digit.
    Dot,
    Fraction,
    /// After `e`/`E`.
    Exponent,
    /// After the exponent sign.
    ExponentSign,
    ExponentDigits,
}

impl NumberState {
    fn start(first: u8) -> Option<Self> {
        match first {
            b'-' => Some(NumberState::Minus),
            b'0' => Some(NumberState::Zero),
            b'1'..=b'9' => Some(NumberState::Integer),
            _ => None,
        }
    }

    fn next(self, c: u8) -> Option<Self> {
        use NumberState::*;
        match (self, c) {
            (Minus, b'0') => Some(Zero),
            (Minus, b'1'..=b'9') => Some(Integer),
            (Integer, b'0'..=b'9') => Some(Integer),
            (Zero | Integer, b'.') => Some(Dot),
            (Dot | Fraction, b'0'..=b'9') => Some(Fraction),
            (Zero | Integer | Fraction, b'e' | b'E') => Some(Exponent),
            (Exponent, b'+' | b'-') => Some(ExponentSign),
            (Exponent | ExponentSign | ExponentDigits, b'0'..=b'9') => Some(ExponentDigits),
            _ => None,
        }
    }

    fn is_complete(self) -> bool {
        matches!(
            self,
            NumberState::Zero
                | NumberState::Integer
                | NumberState::Fraction
                | NumberState::ExponentDigits
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Unquoted {
    Keyword {
        value_type: ValueType,
        rest: &'static [u8],
    },
    Number(NumberState),
}

impl Unquoted {
    fn start(first: u8) -> Option<Self> {
        let keyword = |value_type, rest: &'static [u8]| Some(Unquoted::Keyword { value_type, rest });
        match first {
            b't' => keyword(ValueType::Boolean, b"rue"),
            b'f' => keyword(ValueType::Boolean, b"alse"),
            b'n' => keyword(ValueType::Null, b"ull"),
            _ => NumberState::start(first).map(Unquoted::Number),
        }
    }

    fn next(self, c: u8) -> Option<Self> {
        match self {
            Unquoted::Keyword { value_type, rest } => match rest.split_first() {
                Some((&expected, rest)) if expected == c => {
                    Some(Unquoted::Keyword { value_type, rest })
                }
                _ => None,
            },
            Unquoted::Number(state) => state.next(c).map(Unquoted::Number),
        }
    }

    fn finish(self) -> Option<ValueType> {
        match self {
            Unquoted::Keyword { value_type, rest } if rest.is_empty() => Some(value_type),
            Unquoted::Number(state) if state.is_complete() => Some(ValueType::Number),
            _ => None,
        }
    }
}

/// Reads a keyword or number starting with `first`, which the caller has already read.
///
/// Returns the value and the byte that ended it (whitespace, `,`, `}` or `]`), which the
/// caller must process next instead of reading a new one. Numbers are only checked
/// against the JSON grammar here; conversion happens in [`Value::to`].
pub fn parse_unquoted_value<C: Context + ?Sized>(
    ctx: &C,
    first: Option<u8>,
) -> Result<(Value<'_>, u8), ParseError> {
    let offset = ctx.read_offset().saturating_sub(1);
    let first = first.ok_or_else(|| ParseError::at(ctx, ErrorReason::UnterminatedValue))?;
    if is_terminator(first) {
        return Err(ParseError::at(ctx, ErrorReason::ExpectedValue));
    }

    ctx.begin_literal();
    let mut token =
        Unquoted::start(first).ok_or_else(|| ParseError::at(ctx, ErrorReason::InvalidValue))?;
    ctx.write(first);

    let terminator = loop {
        let c = ctx
            .read()
            .ok_or_else(|| ParseError::at(ctx, ErrorReason::UnterminatedValue))?;
        if is_terminator(c) {
            break c;
        }
        token = token
            .next(c)
            .ok_or_else(|| ParseError::at(ctx, ErrorReason::InvalidValue))?;
        ctx.write(c);
    };

    let value_type = token
        .finish()
        .ok_or_else(|| ParseError::at(ctx, ErrorReason::InvalidValue))?;
    let raw = core::str::from_utf8(ctx.end_literal())
        .map_err(|_| ParseError::at(ctx, ErrorReason::InvalidValue))?;
    Ok((Value::at(value_type, raw, offset), terminator))
}
