// SPDX-License-Identifier: Apache-2.0

// Panic-free base-10 integer parsing, mostly borrowed from core::num::parse::radix.
// Stricter than `str::parse`: no `+` sign, and `-` is never accepted for unsigned types.

/// A custom error type for const integer parsing.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ConstParseIntegerError {
    /// The input byte slice was empty.
    Empty,
    /// The input consisted only of `-`.
    SignOnly,
    /// A byte that is not a base-10 digit (this includes `.`, `e` and `+`).
    InvalidDigit,
    /// The number overflowed or underflowed the target integer type.
    Overflow,
}

/// Creates a panic-free, const-stable, base-10 parser for a specific integer type.
macro_rules! define_const_parser {
    ($fn_name:ident, $int_ty:ty, signed = $signed:literal) => {
        /// Parses a byte slice into a(n) `
        #[doc = stringify!($int_ty)]
        /// ` in a `const` context.
        ///
        /// This function is guaranteed not to panic.
        pub const fn $fn_name(src: &[u8]) -> Result<$int_ty, ConstParseIntegerError> {
            let (is_negative, mut digits) = match src {
                [] => return Err(ConstParseIntegerError::Empty),
                [b'-', rest @ ..] if $signed => (true, rest),
                _ => (false, src),
            };

            if digits.is_empty() {
                return Err(ConstParseIntegerError::SignOnly);
            }

            let mut result: $int_ty = 0;

            while let Some((&byte, rest)) = digits.split_first() {
                let digit = match byte {
                    b'0'..=b'9' => (byte - b'0') as $int_ty,
                    _ => return Err(ConstParseIntegerError::InvalidDigit),
                };

                result = match result.checked_mul(10) {
                    Some(val) => val,
                    None => return Err(ConstParseIntegerError::Overflow),
                };

                // Building the number negatively from the start correctly handles MIN.
                let next = if is_negative {
                    result.checked_sub(digit)
                } else {
                    result.checked_add(digit)
                };
                result = match next {
                    Some(val) => val,
                    None => return Err(ConstParseIntegerError::Overflow),
                };

                digits = rest;
            }

            Ok(result)
        }
    };
}

define_const_parser!(from_ascii_i8, i8, signed = true);
define_const_parser!(from_ascii_i16, i16, signed = true);
define_const_parser!(from_ascii_i32, i32, signed = true);
define_const_parser!(from_ascii_i64, i64, signed = true);
define_const_parser!(from_ascii_i128, i128, signed = true);
define_const_parser!(from_ascii_isize, isize, signed = true);
define_const_parser!(from_ascii_u8, u8, signed = false);
define_const_parser!(from_ascii_u16, u16, signed = false);
define_const_parser!(from_ascii_u32, u32, signed = false);
define_const_parser!(from_ascii_u64, u64, signed = false);
define_const_parser!(from_ascii_u128, u128, signed = false);
define_const_parser!(from_ascii_usize, usize, signed = false);
