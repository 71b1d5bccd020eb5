/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix Tag-Value
//!
//! FIX tag=value encoding, decoding and validation for the ctfix client.
//!
//! This crate provides:
//! - **Checksum**: modulo-256 byte sum used by the builder and the validator
//! - **Decoder**: total, lenient decoding of a raw message into a [`FieldMap`]
//! - **Builder**: header, body and trailer assembly for any [`RequestMessage`]
//! - **Validator**: mandatory-field and checksum checks, plus a diagnostic dump
//!
//! [`FieldMap`]: ctfix_core::FieldMap
//! [`RequestMessage`]: ctfix_core::RequestMessage

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod validator;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

pub use checksum::calculate_checksum;
pub use decoder::Decoder;
pub use encoder::{MessageBuilder, encode_field};
pub use validator::Validator;
