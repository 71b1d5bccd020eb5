/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Event fan-out.
//!
//! The reader task publishes every [`SessionEvent`] once to a [`Dispatcher`],
//! which forwards it to each registered [`Subscriber`] in registration order.
//! The message channel and the [`Application`] callbacks are two such
//! subscribers; more can be added without touching the reader.

use crate::application::Application;
use async_trait::async_trait;
use ctfix_core::error::ConnectionError;
use ctfix_core::message::ResponseMessage;
use ctfix_core::types::SessionId;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Something that happened on a connection.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The socket is open.
    Connected,
    /// A message was decoded.
    Message(Arc<ResponseMessage>),
    /// The session ended.
    Disconnected(ConnectionError),
}

/// Receives session events.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Handles one event.
    async fn notify(&self, event: &SessionEvent);
}

/// Pushes incoming messages onto a bounded channel.
///
/// Never waits for capacity: a message that does not fit is dropped.
#[derive(Debug)]
pub struct ChannelSubscriber {
    tx: mpsc::Sender<Arc<ResponseMessage>>,
}

impl ChannelSubscriber {
    /// Creates a subscriber and the receiving end of its channel.
    ///
    /// # Arguments
    /// * `capacity` - Channel capacity, at least 1
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<ResponseMessage>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn notify(&self, event: &SessionEvent) {
        let SessionEvent::Message(message) = event else {
            return;
        };
        match self.tx.try_send(Arc::clone(message)) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    msg_type = dropped.msg_type_code(),
                    "message channel full, dropping message"
                );
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Forwards events to an [`Application`].
pub struct ApplicationSubscriber<A: Application> {
    application: Arc<A>,
    session_id: SessionId,
}

impl<A: Application> ApplicationSubscriber<A> {
    /// Creates a subscriber for the given application and session.
    #[must_use]
    pub const fn new(application: Arc<A>, session_id: SessionId) -> Self {
        Self {
            application,
            session_id,
        }
    }
}

#[async_trait]
impl<A: Application> Subscriber for ApplicationSubscriber<A> {
    async fn notify(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Connected => self.application.on_connected(&self.session_id).await,
            SessionEvent::Message(message) => {
                self.application
                    .on_message(message, &self.session_id)
                    .await;
            }
            SessionEvent::Disconnected(reason) => {
                self.application
                    .on_disconnected(reason, &self.session_id)
                    .await;
            }
        }
    }
}

/// Ordered list of subscribers.
#[derive(Default)]
pub struct Dispatcher {
    subscribers: RwLock<Vec<Arc<dyn Subscriber>>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber. It sees events published after this call.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Returns the number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns true if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Delivers an event to every subscriber, one after another.
    pub async fn dispatch(&self, event: &SessionEvent) {
        let subscribers = self.subscribers.read().clone();
        for subscriber in subscribers {
            subscriber.notify(event).await;
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.len())
            .finish()
    }
}
