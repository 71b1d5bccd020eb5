/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix Core
//!
//! Core types, traits, and error definitions for the ctfix FIX client.
//!
//! This crate provides the fundamental building blocks used across all ctfix crates:
//! - **Error types**: Validation, usage and transport errors built with `thiserror`
//! - **Field types**: Tag constants, the static field-name table and [`FieldMap`]
//! - **Message types**: [`MsgType`], [`ResponseMessage`] and the [`RequestMessage`] trait
//! - **Core types**: `SeqNum`, `Timestamp`, `CompId`, `Side`, `OrdType`, `SessionId`

pub mod error;
pub mod field;
pub mod message;
pub mod types;

pub use error::{ConnectionError, FixError, Result, SessionError, ValidationError};
pub use field::{Field, FieldMap, field_name};
pub use message::{MsgType, RequestMessage, ResponseMessage};
pub use types::{CompId, OrdType, SeqNum, SessionId, Side, Timestamp};
