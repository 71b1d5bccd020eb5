/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Structural validation and human-readable dumps of raw FIX messages.

use crate::SOH;
use crate::checksum::{calculate_checksum, parse_checksum};
use crate::decoder::Decoder;
use ctfix_core::error::ValidationError;
use ctfix_core::field::{field_name, tags};
use ctfix_core::message::MsgType;
use memchr::{memchr, memmem};
use std::fmt::Write;

/// Fields every message must carry, checked in this order.
const REQUIRED_FIELDS: [(u32, &str); 4] = [
    (tags::BEGIN_STRING, "BeginString"),
    (tags::BODY_LENGTH, "BodyLength"),
    (tags::MSG_TYPE, "MsgType"),
    (tags::CHECKSUM, "CheckSum"),
];

/// Checks and formats raw messages that use a given delimiter.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    decoder: Decoder,
}

impl Validator {
    /// Creates a validator for the given delimiter.
    #[must_use]
    pub const fn new(delimiter: u8) -> Self {
        Self {
            decoder: Decoder::new(delimiter),
        }
    }

    /// Validates mandatory fields and the checksum of a raw message.
    ///
    /// The checksum covers every byte up to and including the delimiter
    /// that precedes the last `10=` field.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found: empty input, then the
    /// missing mandatory fields (8, 9, 35, 10), then checksum problems.
    pub fn validate(&self, message: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        let raw = message.as_ref();
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }

        let fields = self.decoder.decode_fields(raw);
        for (tag, name) in REQUIRED_FIELDS {
            if !fields.contains(tag) {
                return Err(ValidationError::MissingField { tag, name });
            }
        }

        let delimiter = self.decoder.delimiter();
        let needle = [delimiter, b'1', b'0', b'='];
        let idx = memmem::rfind(raw, &needle).ok_or(ValidationError::ChecksumNotFound)?;

        let value_start = idx + needle.len();
        let value_end = memchr(delimiter, &raw[value_start..])
            .map_or(raw.len(), |pos| value_start + pos);
        let value = &raw[value_start..value_end];

        let declared = parse_checksum(value).ok_or_else(|| ValidationError::InvalidChecksum {
            value: String::from_utf8_lossy(value).into_owned(),
        })?;
        let calculated = u32::from(calculate_checksum(&raw[..=idx]));

        if calculated != declared {
            return Err(ValidationError::ChecksumMismatch {
                calculated,
                declared,
            });
        }
        Ok(())
    }

    /// Produces a multi-line dump of a raw message.
    ///
    /// The first line names the message type, or shows the bare code when the
    /// type is not known. It is followed by one `Name: value`
    /// line per value. Repeated tags are indexed as `Name[i]: value` and
    /// unknown tags are shown as `Field<tag>`.
    #[must_use]
    pub fn format(&self, message: impl AsRef<[u8]>) -> String {
        let fields = self.decoder.decode_fields(message.as_ref());
        let mut out = String::new();

        if let Some(code) = fields.get(tags::MSG_TYPE) {
            let msg_type: MsgType = match code.parse() {
                Ok(msg_type) => msg_type,
                Err(never) => match never {},
            };
            match msg_type.name() {
                Some(name) => {
                    let _ = writeln!(out, "Message Type: {name} ({code})");
                }
                None => {
                    let _ = writeln!(out, "Message Type: {code}");
                }
            }
        }

        for (tag, values) in fields.iter() {
            let label = field_name(tag)
                .map_or_else(|| format!("Field{tag}"), ToString::to_string);
            if values.len() == 1 {
                let _ = writeln!(out, "{label}: {}", values[0]);
            } else {
                for (i, value) in values.iter().enumerate() {
                    let _ = writeln!(out, "{label}[{i}]: {value}");
                }
            }
        }
        out
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(SOH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(prefix: &str) -> String {
        let checksum = calculate_checksum(prefix.as_bytes());
        format!("{prefix}10={checksum:03}|")
    }

    #[test]
    fn test_validate_ok() {
        let msg = with_checksum("8=FIX.4.4|9=5|35=0|");
        assert_eq!(Validator::new(b'|').validate(&msg), Ok(()));
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(Validator::new(b'|').validate(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_validate_missing_fields_in_order() {
        let validator = Validator::new(b'|');
        assert_eq!(
            validator.validate("9=5|35=0|10=000|"),
            Err(ValidationError::MissingField {
                tag: 8,
                name: "BeginString"
            })
        );
        assert_eq!(
            validator.validate("8=FIX.4.4|35=0|10=000|"),
            Err(ValidationError::MissingField {
                tag: 9,
                name: "BodyLength"
            })
        );
        assert_eq!(
            validator.validate("8=FIX.4.4|9=5|10=000|"),
            Err(ValidationError::MissingField {
                tag: 35,
                name: "MsgType"
            })
        );
        assert_eq!(
            validator.validate("8=FIX.4.4|9=5|35=0|"),
            Err(ValidationError::MissingField {
                tag: 10,
                name: "CheckSum"
            })
        );
    }

    #[test]
    fn test_validate_missing_begin_string_message() {
        let err = Validator::new(b'|').validate("9=5|35=0|10=000|").unwrap_err();
        assert_eq!(err.to_string(), "missing BeginString field (8)");
    }

    #[test]
    fn test_validate_checksum_mismatch() {
        let prefix = "8=FIX.4.4|9=5|35=0|";
        let good = u32::from(calculate_checksum(prefix.as_bytes()));
        let bad = (good + 1) % 256;
        let msg = format!("{prefix}10={bad:03}|");
        assert_eq!(
            Validator::new(b'|').validate(&msg),
            Err(ValidationError::ChecksumMismatch {
                calculated: good,
                declared: bad
            })
        );
    }

    #[test]
    fn test_validate_invalid_checksum_format() {
        let msg = "8=FIX.4.4|9=5|35=0|10=ABC|";
        assert_eq!(
            Validator::new(b'|').validate(msg),
            Err(ValidationError::InvalidChecksum {
                value: "ABC".to_string()
            })
        );
    }

    #[test]
    fn test_validate_checksum_without_trailing_delimiter() {
        let prefix = "8=FIX.4.4|9=5|35=0|";
        let checksum = calculate_checksum(prefix.as_bytes());
        let msg = format!("{prefix}10={checksum:03}");
        assert_eq!(Validator::new(b'|').validate(&msg), Ok(()));
    }

    #[test]
    fn test_validate_checksum_at_start_is_not_found() {
        // tag 10 decodes, but no delimiter precedes it
        let msg = "10=000|8=FIX.4.4|9=5|35=0|";
        assert_eq!(
            Validator::new(b'|').validate(msg),
            Err(ValidationError::ChecksumNotFound)
        );
    }

    #[test]
    fn test_format_message() {
        let out = Validator::new(b'|').format("8=FIX.4.4|35=A|49=S|9999=x|");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Message Type: Logon (A)");
        assert!(lines.contains(&"BeginString: FIX.4.4"));
        assert!(lines.contains(&"SenderCompID: S"));
        assert!(lines.contains(&"Field9999: x"));
    }

    #[test]
    fn test_format_repeated_fields() {
        let out = Validator::new(b'|').format("35=V|269=0|269=1|");
        assert!(out.contains("MDEntryType[0]: 0"));
        assert!(out.contains("MDEntryType[1]: 1"));
    }

    #[test]
    fn test_format_unknown_msg_type() {
        let out = Validator::new(b'|').format("35=ZZ|");
        assert!(out.starts_with("Message Type: ZZ\n"));
    }
}
