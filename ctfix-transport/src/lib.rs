/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix Transport
//!
//! Network transport layer for the ctfix FIX client.
//!
//! This crate provides:
//! - **Codec**: Tokio codec that splits a byte stream into FIX messages
//! - **TCP transport**: Dialer with a bounded connect timeout
//! - **TLS support**: Optional TLS encryption via rustls

pub mod codec;
pub mod stream;
pub mod tls;

pub use codec::{CodecError, DEFAULT_MAX_MESSAGE_SIZE, FrameCodec};
pub use stream::{AsyncStream, BoxedStream, connect};
pub use tls::TlsOptions;
