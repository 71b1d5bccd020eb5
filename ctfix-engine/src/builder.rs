/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Connection builder for fluent configuration.

use crate::application::{Application, NoOpApplication};
use crate::connection::{Connection, ConnectionOptions};
use crate::subscriber::{ApplicationSubscriber, ChannelSubscriber, Dispatcher};
use ctfix_session::SessionConfig;
use ctfix_tagvalue::SOH;
use ctfix_transport::{DEFAULT_MAX_MESSAGE_SIZE, TlsOptions};
use std::sync::Arc;
use std::time::Duration;

/// Default dial plus handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default capacity of the incoming message channel.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 100;

/// Default capacity of the error channel.
pub const DEFAULT_ERROR_CAPACITY: usize = 10;

/// Builder for a [`Connection`].
#[derive(Debug)]
pub struct ConnectionBuilder<A: Application = NoOpApplication> {
    /// Application callback handler.
    application: Arc<A>,
    /// Session identity and credentials.
    config: SessionConfig,
    host: String,
    port: u16,
    /// Whether to use TLS.
    use_tls: bool,
    /// TLS settings, used only when TLS is enabled.
    tls: TlsOptions,
    delimiter: u8,
    /// Dial plus handshake timeout.
    connect_timeout: Duration,
    message_capacity: usize,
    error_capacity: usize,
    max_message_size: usize,
    /// Answer TestRequest with Heartbeat automatically.
    auto_heartbeat: bool,
}

impl ConnectionBuilder<NoOpApplication> {
    /// Creates a builder for a plain TCP connection with default settings.
    ///
    /// # Arguments
    /// * `config` - Session identity and credentials
    /// * `host` - Server host name or address
    /// * `port` - Server port
    #[must_use]
    pub fn new(config: SessionConfig, host: impl Into<String>, port: u16) -> Self {
        Self {
            application: Arc::new(NoOpApplication),
            config,
            host: host.into(),
            port,
            use_tls: false,
            tls: TlsOptions::new(),
            delimiter: SOH,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
            error_capacity: DEFAULT_ERROR_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            auto_heartbeat: false,
        }
    }
}

impl<A: Application + 'static> ConnectionBuilder<A> {
    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application<B: Application>(self, application: B) -> ConnectionBuilder<B> {
        ConnectionBuilder {
            application: Arc::new(application),
            config: self.config,
            host: self.host,
            port: self.port,
            use_tls: self.use_tls,
            tls: self.tls,
            delimiter: self.delimiter,
            connect_timeout: self.connect_timeout,
            message_capacity: self.message_capacity,
            error_capacity: self.error_capacity,
            max_message_size: self.max_message_size,
            auto_heartbeat: self.auto_heartbeat,
        }
    }

    /// Enables TLS for the connection.
    #[must_use]
    pub const fn with_tls(mut self, enabled: bool) -> Self {
        self.use_tls = enabled;
        self
    }

    /// Overrides the name checked against the server certificate.
    /// Defaults to the host.
    #[must_use]
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.tls = self.tls.with_server_name(name);
        self
    }

    /// Skips server certificate verification. Test environments only.
    #[must_use]
    pub fn with_danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.tls = self.tls.with_danger_accept_invalid_certs(accept);
        self
    }

    /// Sets the field delimiter used on the wire.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the capacity of the incoming message channel.
    #[must_use]
    pub const fn with_message_capacity(mut self, capacity: usize) -> Self {
        self.message_capacity = capacity;
        self
    }

    /// Sets the capacity of the error channel.
    #[must_use]
    pub const fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    /// Sets the largest accepted incoming message.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Answers incoming TestRequest messages with a Heartbeat.
    #[must_use]
    pub const fn with_auto_heartbeat(mut self, enabled: bool) -> Self {
        self.auto_heartbeat = enabled;
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns whether TLS is enabled.
    #[must_use]
    pub const fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// Returns the field delimiter.
    #[must_use]
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the incoming message channel capacity.
    #[must_use]
    pub const fn message_capacity(&self) -> usize {
        self.message_capacity
    }

    /// Returns the error channel capacity.
    #[must_use]
    pub const fn error_capacity(&self) -> usize {
        self.error_capacity
    }

    /// Returns whether TestRequest is answered automatically.
    #[must_use]
    pub const fn auto_heartbeat(&self) -> bool {
        self.auto_heartbeat
    }

    /// Returns the application handler.
    #[must_use]
    pub fn application(&self) -> Arc<A> {
        Arc::clone(&self.application)
    }

    /// Builds the connection. Nothing is dialed until
    /// [`Connection::connect`].
    ///
    /// The message channel is fed before the application callbacks for
    /// every event.
    #[must_use]
    pub fn build(self) -> Connection {
        let dispatcher = Dispatcher::new();
        let (channel, messages) = ChannelSubscriber::channel(self.message_capacity);
        dispatcher.subscribe(Arc::new(channel));
        dispatcher.subscribe(Arc::new(ApplicationSubscriber::new(
            self.application,
            self.config.session_id.clone(),
        )));

        let options = ConnectionOptions {
            host: self.host,
            port: self.port,
            tls: self.use_tls.then_some(self.tls),
            delimiter: self.delimiter,
            connect_timeout: self.connect_timeout,
            max_message_size: self.max_message_size,
            auto_heartbeat: self.auto_heartbeat,
        };

        Connection::new(
            self.config,
            options,
            dispatcher,
            messages,
            self.error_capacity,
        )
    }
}
