/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix Session
//!
//! Session-level building blocks for the ctfix client.
//!
//! This crate provides:
//! - **Configuration**: Session identity, credentials and heartbeat interval
//! - **Sequence management**: Atomic outbound sequence numbering
//! - **Connection state**: The `Disconnected -> Connecting -> Connected` lifecycle

pub mod config;
pub mod sequence;
pub mod state;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use sequence::SequenceManager;
pub use state::ConnectionState;
