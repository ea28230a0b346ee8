// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use crate::value::ValueType;
use crate::Context;

/// The reason a parse or conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorReason {
    /// A field name did not start with `"`.
    ExpectedOpeningQuote,
    /// A quoted string was not closed.
    ExpectedClosingQuote,
    /// An object or array did not start with `{` / `[`.
    ExpectedOpeningBracket,
    /// A field name was not followed by `:`.
    ExpectedColon,
    /// A field or element was followed by something other than `,` or the closing bracket.
    ExpectedCommaOrClosingBracket,
    /// A value position held a delimiter instead of a value.
    ExpectedValue,
    /// A callback was handed an object or array and did not parse (or ignore) it.
    NestedObjectOrArrayNotParsed,
    /// Unknown character after `\`, or a non-hex digit inside `\uXXXX`.
    InvalidEscapeSequence,
    /// A `\u` escape that does not form a valid code point.
    InvalidUtf16Character,
    /// A high surrogate was not followed by a `\u` escape.
    ExpectedUtf16LowSurrogate,
    /// `\u0000` appeared in a string.
    NullUtf16Character,
    /// A decoded string was not valid UTF-8.
    InvalidUtf8,
    /// Malformed number or keyword.
    InvalidValue,
    /// Input ended in the middle of a number or keyword, or where a value was due.
    UnterminatedValue,
    /// Containers were nested deeper than the context allows.
    ExceededNestingLimit,
    /// A value was converted to a type its JSON type cannot represent.
    TypeMismatch {
        /// The JSON type of the value.
        found: ValueType,
    },
    /// A number could not be represented in the requested numeric type.
    OutOfRange,
    /// A dispatcher finished an object without seeing a required field.
    MissingField(String),
    /// A dispatcher saw a field that no handler accepted.
    UnhandledField(String),
}

impl core::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorReason::ExpectedOpeningQuote => f.write_str("Expected opening quote"),
            ErrorReason::ExpectedClosingQuote => f.write_str("Expected closing quote"),
            ErrorReason::ExpectedOpeningBracket => f.write_str("Expected opening bracket"),
            ErrorReason::ExpectedColon => f.write_str("Expected colon"),
            ErrorReason::ExpectedCommaOrClosingBracket => {
                f.write_str("Expected comma or closing bracket")
            }
            ErrorReason::ExpectedValue => f.write_str("Expected value"),
            ErrorReason::NestedObjectOrArrayNotParsed => {
                f.write_str("Nested object or array not parsed")
            }
            ErrorReason::InvalidEscapeSequence => f.write_str("Invalid escape sequence"),
            ErrorReason::InvalidUtf16Character => f.write_str("Invalid UTF-16 character"),
            ErrorReason::ExpectedUtf16LowSurrogate => f.write_str("Expected UTF-16 low surrogate"),
            ErrorReason::NullUtf16Character => f.write_str("Null UTF-16 character"),
            ErrorReason::InvalidUtf8 => f.write_str("Invalid UTF-8"),
            ErrorReason::InvalidValue => f.write_str("Invalid value"),
            ErrorReason::UnterminatedValue => f.write_str("Unterminated value"),
            ErrorReason::ExceededNestingLimit => f.write_str("Exceeded nesting limit"),
            ErrorReason::TypeMismatch { found } => write!(f, "Bad value cast from {found:?}"),
            ErrorReason::OutOfRange => f.write_str("Value out of range"),
            ErrorReason::MissingField(name) => {
                write!(f, "At least one required JSON field is missing: {name}")
            }
            ErrorReason::UnhandledField(name) => write!(f, "A JSON field was not handled: {name}"),
        }
    }
}

/// Error returned by every parse, conversion and dispatch operation.
///
/// `offset` is the 0-based position of the last byte consumed when the error was raised,
/// or 0 if nothing had been consumed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    offset: usize,
    reason: ErrorReason,
}

impl ParseError {
    pub fn new(offset: usize, reason: ErrorReason) -> Self {
        Self { offset, reason }
    }

    /// Builds an error located at the last byte `ctx` has handed out.
    pub(crate) fn at<C: Context + ?Sized>(ctx: &C, reason: ErrorReason) -> Self {
        let error = Self::new(ctx.read_offset().saturating_sub(1), reason);
        log::debug!("parse failed: {error}");
        error
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reason(&self) -> &ErrorReason {
        &self.reason
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at offset {}", self.reason, self.offset)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_includes_offset() {
        let error = ParseError::new(7, ErrorReason::ExpectedColon);
        assert_eq!(error.to_string(), "Expected colon at offset 7");
        assert_eq!(error.offset(), 7);
        assert_eq!(error.reason(), &ErrorReason::ExpectedColon);
    }

    #[test]
    fn test_dispatch_messages_name_the_field() {
        let missing = ErrorReason::MissingField("ticker".into());
        assert_eq!(
            missing.to_string(),
            "At least one required JSON field is missing: ticker"
        );
        let unhandled = ErrorReason::UnhandledField("extra".into());
        assert_eq!(unhandled.to_string(), "A JSON field was not handled: extra");
    }

    #[test]
    fn test_type_mismatch_message() {
        let reason = ErrorReason::TypeMismatch {
            found: ValueType::Null,
        };
        assert_eq!(reason.to_string(), "Bad value cast from Null");
    }
}
