/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Connection lifecycle states.
//!
//! ```text
//! Disconnected --connect--> Connecting --dial ok--> Connected
//!      ^                        |                      |
//!      +-------dial failed------+     disconnect / read error
//!      +-----------------------------------------------+
//! ```
//!
//! There is no reconnecting state. Reconnection is an explicit `connect`
//! from `Disconnected`.

use std::fmt;

/// Current state of a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket is open.
    #[default]
    Disconnected,
    /// A dial is in progress.
    Connecting,
    /// The socket is open and the reader task is running.
    Connected,
}

impl ConnectionState {
    /// Returns true if messages can be sent.
    #[inline]
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if `connect` may be called.
    #[inline]
    #[must_use]
    pub const fn can_connect(self) -> bool {
        matches!(self, Self::Disconnected)
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        let state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(state.can_connect());
        assert!(!state.is_connected());
    }

    #[test]
    fn test_only_connected_can_send() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Connecting.can_connect());
        assert!(!ConnectionState::Connected.can_connect());
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
    }
}
