/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix Engine
//!
//! Asynchronous FIX client session for the ctfix protocol implementation.
//!
//! This crate provides:
//! - **Connection**: dial, send, receive and disconnect over TCP or TLS
//! - **Application trait**: callback interface for session events
//! - **Subscribers**: fan-out of session events to channels and callbacks
//! - **Builder API**: fluent configuration for connection setup

pub mod application;
pub mod builder;
pub mod connection;
pub mod subscriber;

pub use application::{Application, NoOpApplication};
pub use builder::ConnectionBuilder;
pub use connection::Connection;
pub use subscriber::{ChannelSubscriber, Dispatcher, SessionEvent, Subscriber};
