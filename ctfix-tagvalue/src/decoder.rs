/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Lenient FIX message decoder.
//!
//! Decoding is total: every input yields a [`FieldMap`], possibly empty.
//! Segments without `=` or with a non-numeric tag are dropped. Repeated tags
//! keep every value in order of appearance.

use crate::SOH;
use ctfix_core::field::FieldMap;
use ctfix_core::message::{DISPLAY_SEPARATOR, ResponseMessage};
use memchr::memchr;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// FIX message decoder bound to a field delimiter.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    delimiter: u8,
}

impl Decoder {
    /// Creates a decoder using the given field delimiter.
    #[inline]
    #[must_use]
    pub const fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Returns the configured delimiter.
    #[inline]
    #[must_use]
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Parses raw message text into a field map.
    ///
    /// Values are split at the first `=` only, so `58=a=b` yields `a=b`.
    /// Non-UTF-8 bytes are replaced rather than rejected.
    #[must_use]
    pub fn decode_fields(&self, raw: &[u8]) -> FieldMap {
        let mut fields = FieldMap::new();
        for segment in raw.split(|&b| b == self.delimiter) {
            if segment.is_empty() {
                continue;
            }
            let Some(eq_pos) = memchr(EQUALS, segment) else {
                continue;
            };
            let Some(tag) = parse_tag(&segment[..eq_pos]) else {
                continue;
            };
            let value = String::from_utf8_lossy(&segment[eq_pos + 1..]);
            fields.push(tag, value.into_owned());
        }
        fields
    }

    /// Turns one framed message into a [`ResponseMessage`].
    ///
    /// The display text has every delimiter replaced with `|`.
    #[must_use]
    pub fn decode(&self, raw: &[u8]) -> ResponseMessage {
        let fields = self.decode_fields(raw);
        let text: String = String::from_utf8_lossy(raw)
            .chars()
            .map(|c| {
                if c == char::from(self.delimiter) {
                    DISPLAY_SEPARATOR
                } else {
                    c
                }
            })
            .collect();
        ResponseMessage::new(text, fields)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(SOH)
    }
}

/// Parses raw message text using the given delimiter.
///
/// Shorthand for `Decoder::new(delimiter).decode_fields(raw)`.
#[must_use]
pub fn decode_fields(raw: &[u8], delimiter: u8) -> FieldMap {
    Decoder::new(delimiter).decode_fields(raw)
}

/// Parses a tag number from ASCII digits.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    Some(result)
}
