/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! The framer is lenient: a frame ends at the first `10=` field that starts
//! a field (at the buffer start or right after a delimiter), carries one or
//! more digits and is closed by a delimiter. The checksum value itself is not
//! checked here; use [`Validator`](ctfix_tagvalue::Validator) for that.
//!
//! A field value that itself contains `<delimiter>10=<digits><delimiter>`
//! would end a frame early. Counterparties are not expected to send such
//! values, so the rule is kept as is.

use bytes::BytesMut;
use ctfix_tagvalue::SOH;
use memchr::memmem;
use thiserror::Error;
use tokio_util::codec::Decoder;

/// Default maximum frame size (1 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

const CHECKSUM_MARKER: &[u8] = b"10=";

/// Errors that can occur during codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffered bytes exceed the maximum without a frame boundary.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Buffered size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Splits a byte stream into complete FIX messages.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Field delimiter.
    delimiter: u8,
    /// Maximum buffered bytes before a boundary must appear.
    max_message_size: usize,
    /// Offset from which the next boundary search starts.
    scanned: usize,
}

impl FrameCodec {
    /// Creates a new codec with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: SOH,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            scanned: 0,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Returns the end offset (exclusive) of the first complete frame.
    ///
    /// Also returns the offset from which a later search may resume when no
    /// boundary is found yet.
    fn find_boundary(&self, buf: &[u8]) -> Result<usize, usize> {
        let mut resume = self.scanned.min(buf.len());
        for pos in memmem::find_iter(&buf[resume..], CHECKSUM_MARKER).map(|p| p + resume) {
            if pos > 0 && buf[pos - 1] != self.delimiter {
                continue;
            }

            let value_start = pos + CHECKSUM_MARKER.len();
            let digits = buf[value_start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            let value_end = value_start + digits;

            if value_end == buf.len() {
                // the trailer may still be arriving
                return Err(pos.saturating_sub(1));
            }
            if digits > 0 && buf[value_end] == self.delimiter {
                return Ok(value_end + 1);
            }
        }

        // keep a few bytes so a marker split across reads is still found
        resume = buf.len().saturating_sub(CHECKSUM_MARKER.len());
        Err(resume)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        match self.find_boundary(src) {
            Ok(end) => {
                self.scanned = 0;
                Ok(Some(src.split_to(end)))
            }
            Err(resume) => {
                if src.len() > self.max_message_size {
                    return Err(CodecError::MessageTooLarge {
                        size: src.len(),
                        max_size: self.max_message_size,
                    });
                }
                self.scanned = resume;
                Ok(None)
            }
        }
    }
}
