/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The checksum is the sum of every byte preceding the `10=` field, modulo
//! 256, written as a 3-digit zero-padded decimal.

/// Calculates the FIX checksum for the given data.
///
/// # Arguments
/// * `data` - The message bytes up to and including the delimiter before `10=`
///
/// # Returns
/// The checksum value (0-255).
///
/// # Example
/// ```
/// use ctfix_tagvalue::calculate_checksum;
///
/// assert_eq!(calculate_checksum(b"ABC"), 198);
/// assert_eq!(calculate_checksum(b""), 0);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    let sum = data
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)));
    (sum % 256) as u8
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Arguments
/// * `checksum` - The checksum value (0-255)
///
/// # Returns
/// A 3-byte representation (e.g., "042", "255").
#[inline]
#[must_use]
pub const fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Parses a declared checksum value.
///
/// Any run of ASCII digits is accepted, so a peer that writes `10=7` instead
/// of `10=007` still parses. Values above 255 parse too and simply never match.
///
/// # Returns
/// `Some(value)` if `bytes` is a non-empty string of digits, `None` otherwise.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 9 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result * 10 + u32::from(b - b'0');
    }

    Some(result)
}
