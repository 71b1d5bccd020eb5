/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Session configuration.
//!
//! A [`SessionConfig`] carries the session identity stamped on every header,
//! the logon credentials and the heartbeat interval. It is supplied once and
//! never changes for the lifetime of a connection.

use ctfix_core::error::SessionError;
use ctfix_core::types::{CompId, DEFAULT_BEGIN_STRING, SessionId};
use ctfix_messages::Logon;
use std::fmt;
use std::time::Duration;

/// Default heartbeat interval.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for a FIX session.
#[derive(Clone)]
pub struct SessionConfig {
    /// BeginString, CompIDs and sub IDs.
    pub session_id: SessionId,
    /// Username (553).
    pub username: String,
    /// Password (554).
    pub password: String,
    /// Heartbeat interval, sent as whole seconds in tag 108.
    pub heartbeat_interval: Duration,
    /// Whether logon requests a sequence reset (141=Y).
    pub reset_on_logon: bool,
}

impl SessionConfig {
    /// Creates a new session configuration with required fields.
    ///
    /// # Arguments
    /// * `session_id` - The session identity
    /// * `username` - Logon username
    /// * `password` - Logon password
    #[must_use]
    pub fn new(
        session_id: SessionId,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            username: username.into(),
            password: password.into(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reset_on_logon: false,
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn with_reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Returns the heartbeat interval in seconds.
    #[must_use]
    pub const fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }

    /// Builds the Logon message for this session.
    #[must_use]
    pub fn logon(&self) -> Logon {
        Logon::new(
            self.username.clone(),
            self.password.clone(),
            self.heartbeat_interval_secs(),
        )
        .with_reset_seq_num(self.reset_on_logon)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("session_id", &self.session_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("reset_on_logon", &self.reset_on_logon)
            .finish()
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    begin_string: Option<String>,
    sender_comp_id: Option<String>,
    target_comp_id: Option<String>,
    sender_sub_id: Option<String>,
    target_sub_id: Option<String>,
    username: Option<String>,
    password: Option<String>,
    heartbeat_interval: Option<Duration>,
    reset_on_logon: bool,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the FIX version. Defaults to `FIX.4.4`.
    #[must_use]
    pub fn begin_string(mut self, version: impl Into<String>) -> Self {
        self.begin_string = Some(version.into());
        self
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: impl Into<String>) -> Self {
        self.sender_comp_id = Some(id.into());
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: impl Into<String>) -> Self {
        self.target_comp_id = Some(id.into());
        self
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn sender_sub_id(mut self, id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn target_sub_id(mut self, id: impl Into<String>) -> Self {
        self.target_sub_id = Some(id.into());
        self
    }

    /// Sets the logon username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the logon password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets whether to reset on logon.
    #[must_use]
    pub const fn reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] if a CompID is missing, empty
    /// or too long, if the username or password is missing or empty, or if the
    /// heartbeat interval is zero.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let sender = comp_id("sender_comp_id", self.sender_comp_id)?;
        let target = comp_id("target_comp_id", self.target_comp_id)?;
        let username = credential("username", self.username)?;
        let password = credential("password", self.password)?;
        let begin_string = self
            .begin_string
            .unwrap_or_else(|| DEFAULT_BEGIN_STRING.to_string());

        let heartbeat_interval = self.heartbeat_interval.unwrap_or(DEFAULT_HEARTBEAT_INTERVAL);
        if heartbeat_interval.as_secs() == 0 {
            return Err(SessionError::Configuration(
                "heartbeat_interval must be at least one second".to_string(),
            ));
        }

        let mut session_id = SessionId::new(begin_string, sender, target);
        if let Some(sub_id) = self.sender_sub_id {
            session_id = session_id.with_sender_sub_id(sub_id);
        }
        if let Some(sub_id) = self.target_sub_id {
            session_id = session_id.with_target_sub_id(sub_id);
        }

        Ok(SessionConfig::new(session_id, username, password)
        .with_heartbeat_interval(heartbeat_interval)
        .with_reset_on_logon(self.reset_on_logon))
    }
}

fn comp_id(name: &str, value: Option<String>) -> Result<CompId, SessionError> {
    let value = value.ok_or_else(|| SessionError::Configuration(format!("{name} is required")))?;
    match CompId::new(&value) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(SessionError::Configuration(format!(
            "{name} must be 1 to 64 characters"
        ))),
    }
}

fn credential(name: &str, value: Option<String>) -> Result<String, SessionError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SessionError::Configuration(format!("{name} is required"))),
    }
}
