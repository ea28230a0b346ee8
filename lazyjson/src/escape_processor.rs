// SPDX-License-Identifier: Apache-2.0

//! Escape decoding for string literals: simple backslash escapes and `\uXXXX`
//! sequences, including UTF-16 surrogate pairs.

/// A code unit sequence that does not form a Unicode scalar value.
///
/// Never leaves the crate; the scanner reports it as
/// [`ErrorReason::InvalidUtf16Character`](crate::ErrorReason::InvalidUtf16Character).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EncodingError;

/// Why a completed `\uXXXX` escape could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnicodeEscapeError {
    /// The escape decoded to U+0000.
    NullCharacter,
    Encoding(EncodingError),
}

impl From<EncodingError> for UnicodeEscapeError {
    fn from(err: EncodingError) -> Self {
        UnicodeEscapeError::Encoding(err)
    }
}

pub(crate) struct EscapeProcessor;

impl EscapeProcessor {
    /// Maps the character following a backslash to the byte it stands for.
    /// Returns `None` for `u` (handled separately) and for anything invalid.
    pub fn process_simple_escape(escape_char: u8) -> Option<u8> {
        match escape_char {
            b'"' => Some(b'"'),
            b'\\' => Some(b'\\'),
            b'/' => Some(b'/'),
            b'b' => Some(0x08),
            b'f' => Some(0x0C),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            _ => None,
        }
    }

    pub fn hex_digit_value(byte: u8) -> Option<u16> {
        match byte {
            b'0'..=b'9' => Some(u16::from(byte - b'0')),
            b'a'..=b'f' => Some(u16::from(byte - b'a') + 10),
            b'A'..=b'F' => Some(u16::from(byte - b'A') + 10),
            _ => None,
        }
    }

    pub fn is_high_surrogate(unit: u16) -> bool {
        (0xD800..=0xDBFF).contains(&unit)
    }

    pub fn is_low_surrogate(unit: u16) -> bool {
        (0xDC00..=0xDFFF).contains(&unit)
    }

    /// Combines a UTF-16 code unit pair into a code point.
    ///
    /// A non-surrogate `high` must come with `low == 0`; a high surrogate must come
    /// with a low surrogate.
    pub fn utf16_to_utf32(high: u16, low: u16) -> Result<u32, EncodingError> {
        if !(0xD800..=0xDFFF).contains(&high) {
            return if low == 0 {
                Ok(u32::from(high))
            } else {
                Err(EncodingError)
            };
        }
        if !Self::is_high_surrogate(high) || !Self::is_low_surrogate(low) {
            return Err(EncodingError);
        }
        let (high, low) = (u32::from(high), u32::from(low));
        Ok(0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF))
    }

    /// UTF-8 encodes `code_point` into `buf`, returning the bytes used.
    pub fn encode_utf8(code_point: u32, buf: &mut [u8; 4]) -> Result<&[u8], EncodingError> {
        let ch = char::from_u32(code_point).ok_or(EncodingError)?;
        Ok(ch.encode_utf8(buf).as_bytes())
    }
}

/// Collects the four hex digits of a `\uXXXX` escape and remembers a high surrogate
/// until its partner arrives.
#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeCollector {
    code_unit: u16,
    digits: u8,
    pending_high_surrogate: Option<u16>,
}

impl UnicodeEscapeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new escape; a pending high surrogate is kept.
    pub fn begin(&mut self) {
        self.code_unit = 0;
        self.digits = 0;
    }

    pub fn has_pending_high_surrogate(&self) -> bool {
        self.pending_high_surrogate.is_some()
    }

    /// Adds one digit. `None` if `byte` is not hex, otherwise whether the escape
    /// is now complete.
    pub fn add_hex_digit(&mut self, byte: u8) -> Option<bool> {
        let digit = EscapeProcessor::hex_digit_value(byte)?;
        self.code_unit = (self.code_unit << 4) | digit;
        self.digits = self.digits.saturating_add(1);
        Some(self.digits == 4)
    }

    /// Decodes the completed escape. `Ok(None)` means a high surrogate was stored and
    /// nothing is emitted yet.
    pub fn finish<'b>(
        &mut self,
        utf8: &'b mut [u8; 4],
    ) -> Result<Option<&'b [u8]>, UnicodeEscapeError> {
        let unit = self.code_unit;
        let code_point = match self.pending_high_surrogate.take() {
            Some(high) => EscapeProcessor::utf16_to_utf32(high, unit)?,
            None if unit == 0 => return Err(UnicodeEscapeError::NullCharacter),
            None if EscapeProcessor::is_high_surrogate(unit) => {
                self.pending_high_surrogate = Some(unit);
                return Ok(None);
            }
            None => EscapeProcessor::utf16_to_utf32(unit, 0)?,
        };
        Ok(Some(EscapeProcessor::encode_utf8(code_point, utf8)?))
    }
}
