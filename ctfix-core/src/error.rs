/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Error types for the ctfix FIX client.
//!
//! Errors fall into three families:
//! - [`ValidationError`]: local and non-fatal, produced when checking a raw message
//! - [`SessionError`]: usage errors returned synchronously to the caller
//! - [`ConnectionError`]: transport failures that terminate the session
//!
//! [`FixError`] unifies them for callers that want a single error type.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all ctfix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// A raw message failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The session was used incorrectly.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The underlying transport failed.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Errors reported when validating a raw FIX message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The message text is empty.
    #[error("message is empty")]
    Empty,

    /// A mandatory field is absent.
    #[error("missing {name} field ({tag})")]
    MissingField {
        /// Tag number of the missing field.
        tag: u32,
        /// Human-readable field name.
        name: &'static str,
    },

    /// No `10=` trailer follows a delimiter.
    #[error("checksum field not found")]
    ChecksumNotFound,

    /// The checksum value is not a number.
    #[error("invalid checksum format: {value}")]
    InvalidChecksum {
        /// The raw checksum text.
        value: String,
    },

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: expected {calculated}, got {declared}")]
    ChecksumMismatch {
        /// Checksum calculated over the message prefix.
        calculated: u32,
        /// Checksum declared in the `10=` field.
        declared: u32,
    },
}

/// Usage errors returned synchronously by the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `connect` was called while not disconnected.
    #[error("client is already connected")]
    AlreadyConnected,

    /// A send was attempted without an established connection.
    #[error("client is not connected")]
    NotConnected,

    /// The message does not carry a usable message type code.
    #[error("unsupported message type: {msg_type:?}")]
    UnsupportedType {
        /// The rejected message type code.
        msg_type: String,
    },

    /// The outbound sequence number cannot advance past `u64::MAX`.
    #[error("outbound sequence number exhausted")]
    SequenceExhausted,

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Transport errors. Every variant ends the session.
///
/// The type is `Clone` so a single failure can be fanned out to the error
/// channel and to every subscriber.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// TCP dial failed.
    #[error("failed to connect to {address}: {reason}")]
    Dial {
        /// Address being dialed.
        address: String,
        /// Underlying socket error.
        reason: String,
    },

    /// TCP dial did not complete within the connect timeout.
    #[error("timed out connecting to {address} after {timeout_ms} ms")]
    DialTimeout {
        /// Address being dialed.
        address: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// TLS setup or handshake failed.
    #[error("tls error: {0}")]
    Tls(String),

    /// Writing to the socket failed.
    #[error("failed to send message: {0}")]
    Write(String),

    /// Reading from the socket failed.
    #[error("read error: {0}")]
    Read(String),

    /// The peer closed the stream.
    #[error("connection lost")]
    Closed,

    /// The stream could not be split into messages.
    #[error("framing error: {0}")]
    Framing(String),

    /// The reader task terminated abnormally.
    #[error("internal fault in reader task: {0}")]
    InternalFault(String),

    /// The caller disconnected the session.
    #[error("client disconnected")]
    Disconnected,
}
