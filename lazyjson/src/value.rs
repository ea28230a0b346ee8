// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use crate::int_parser;
use crate::parse_error::{ErrorReason, ParseError};

/// The JSON type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

/// One scalar token, or a marker that an object/array starts here.
///
/// Strings hold their decoded text; numbers and booleans hold the characters exactly as
/// they appeared in the input. Nothing is converted until [`Value::to`] is called.
/// Object and array values carry no text: the callback receiving one must call
/// [`parse_object`](crate::parse_object) / [`parse_array`](crate::parse_array) (or
/// [`ignore`](crate::ignore)) on the same context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value<'a> {
    value_type: ValueType,
    raw: &'a str,
    offset: usize,
}

impl Default for Value<'_> {
    fn default() -> Self {
        Self::new(ValueType::Null, "null")
    }
}

impl<'a> Value<'a> {
    pub fn new(value_type: ValueType, raw: &'a str) -> Self {
        Self::at(value_type, raw, 0)
    }

    pub(crate) fn at(value_type: ValueType, raw: &'a str, offset: usize) -> Self {
        Self {
            value_type,
            raw,
            offset,
        }
    }

    pub(crate) fn container(value_type: ValueType, offset: usize) -> Self {
        Self::at(value_type, "", offset)
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The token text: unescaped for strings, verbatim otherwise, empty for containers.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Input offset where the token starts, used for errors raised by conversions.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Converts the value into `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazyjson::{ErrorReason, Value, ValueType};
    ///
    /// let value = Value::new(ValueType::Number, "300");
    /// assert_eq!(value.to::<u16>().unwrap(), 300);
    /// assert_eq!(value.to::<f64>().unwrap(), 300.0);
    /// assert_eq!(value.to::<u8>().unwrap_err().reason(), &ErrorReason::OutOfRange);
    /// ```
    pub fn to<T: FromValue<'a>>(&self) -> Result<T, ParseError> {
        T::from_value(*self)
    }

    /// Converts the value and stores it in `target`, leaving `target` untouched on error.
    pub fn store_into<T: FromValue<'a>>(&self, target: &mut T) -> Result<(), ParseError> {
        *target = self.to()?;
        Ok(())
    }

    /// The error for a conversion this value's type does not support.
    pub fn type_mismatch(&self) -> ParseError {
        ParseError::new(
            self.offset,
            ErrorReason::TypeMismatch {
                found: self.value_type,
            },
        )
    }

    /// The error for a number that does not fit the requested type.
    pub fn out_of_range(&self) -> ParseError {
        ParseError::new(self.offset, ErrorReason::OutOfRange)
    }

    fn expect_type(&self, expected: ValueType) -> Result<&'a str, ParseError> {
        if self.value_type == expected {
            Ok(self.raw)
        } else {
            Err(self.type_mismatch())
        }
    }
}

/// Conversion from a [`Value`], used by [`Value::to`].
///
/// Implement it for your own types to make them usable as conversion targets:
///
/// ```rust
/// use lazyjson::{FromValue, ParseError, Value, ValueType};
///
/// #[derive(Debug, PartialEq)]
/// enum Side {
///     Buy,
///     Sell,
/// }
///
/// impl<'a> FromValue<'a> for Side {
///     fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
///         match value.to::<&str>()? {
///             "BUY" => Ok(Side::Buy),
///             "SELL" => Ok(Side::Sell),
///             _ => Err(value.type_mismatch()),
///         }
///     }
/// }
///
/// assert_eq!(Value::new(ValueType::String, "SELL").to::<Side>().unwrap(), Side::Sell);
/// ```
pub trait FromValue<'a>: Sized {
    fn from_value(value: Value<'a>) -> Result<Self, ParseError>;
}

impl<'a> FromValue<'a> for &'a str {
    fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
        match value.value_type {
            ValueType::String | ValueType::Number | ValueType::Boolean => Ok(value.raw),
            _ => Err(value.type_mismatch()),
        }
    }
}

impl<'a> FromValue<'a> for String {
    fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
        <&str>::from_value(value).map(String::from)
    }
}

impl<'a> FromValue<'a> for bool {
    fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
        let raw = value.expect_type(ValueType::Boolean)?;
        Ok(raw.starts_with('t'))
    }
}

impl<'a, T: FromValue<'a>> FromValue<'a> for Option<T> {
    fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
        match value.value_type {
            ValueType::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($int_ty:ty => $parse_fn:ident),* $(,)?) => {
        $(
            impl<'a> FromValue<'a> for $int_ty {
                fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
                    let raw = value.expect_type(ValueType::Number)?;
                    int_parser::$parse_fn(raw.as_bytes()).map_err(|_| value.out_of_range())
                }
            }
        )*
    };
}

impl_from_value_int!(
    i8 => from_ascii_i8,
    i16 => from_ascii_i16,
    i32 => from_ascii_i32,
    i64 => from_ascii_i64,
    i128 => from_ascii_i128,
    isize => from_ascii_isize,
    u8 => from_ascii_u8,
    u16 => from_ascii_u16,
    u32 => from_ascii_u32,
    u64 => from_ascii_u64,
    u128 => from_ascii_u128,
    usize => from_ascii_usize,
);

/// Only characters that can appear in a JSON number; keeps `str::parse` from accepting
/// `inf` or `NaN` in caller-built values.
fn number_text(value: &Value<'_>) -> Result<(), ParseError> {
    let valid = !value.raw.is_empty()
        && value
            .raw
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'));
    if valid {
        Ok(())
    } else {
        Err(value.out_of_range())
    }
}

/// True when the mantissa has a nonzero digit, so a parsed zero means underflow.
fn nonzero_mantissa(raw: &str) -> bool {
    raw.bytes()
        .take_while(|b| !matches!(b, b'e' | b'E'))
        .any(|b| matches!(b, b'1'..=b'9'))
}

macro_rules! impl_from_value_float {
    ($($float_ty:ty),*) => {
        $(
            impl<'a> FromValue<'a> for $float_ty {
                fn from_value(value: Value<'a>) -> Result<Self, ParseError> {
                    let raw = value.expect_type(ValueType::Number)?;
                    number_text(&value)?;
                    match raw.parse::<$float_ty>() {
                        Ok(parsed) if parsed == 0.0 && nonzero_mantissa(raw) => {
                            Err(value.out_of_range())
                        }
                        Ok(parsed) if parsed.is_finite() => Ok(parsed),
                        _ => Err(value.out_of_range()),
                    }
                }
            }
        )*
    };
}

impl_from_value_float!(f32, f64);
