/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Application callback interface.
//!
//! Callbacks run on the connection's reader task, in the order events are
//! read from the socket. A slow callback delays delivery of later messages;
//! a panicking callback ends the session with
//! [`ConnectionError::InternalFault`].

use async_trait::async_trait;
use ctfix_core::error::ConnectionError;
use ctfix_core::message::ResponseMessage;
use ctfix_core::types::SessionId;

/// Application callback interface for session events.
///
/// Implement this trait to receive callbacks for connection lifecycle
/// changes and incoming messages.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called once the socket is open and the reader task has started.
    ///
    /// # Arguments
    /// * `session_id` - The session identifier
    async fn on_connected(&self, session_id: &SessionId);

    /// Called for every decoded incoming message.
    ///
    /// # Arguments
    /// * `message` - The received message
    /// * `session_id` - The session identifier
    async fn on_message(&self, message: &ResponseMessage, session_id: &SessionId);

    /// Called when the session ends.
    ///
    /// # Arguments
    /// * `reason` - Why the session ended; [`ConnectionError::Disconnected`]
    ///   for an explicit disconnect
    /// * `session_id` - The session identifier
    async fn on_disconnected(&self, reason: &ConnectionError, session_id: &SessionId);
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_connected(&self, _session_id: &SessionId) {}

    async fn on_message(&self, _message: &ResponseMessage, _session_id: &SessionId) {}

    async fn on_disconnected(&self, _reason: &ConnectionError, _session_id: &SessionId) {}
}
