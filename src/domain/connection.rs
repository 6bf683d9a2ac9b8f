//! Connection state of the job event stream.

use std::fmt;

/// Connection lifecycle of an [`EventStreamClient`](crate::jobs::EventStreamClient).
///
/// Transitions are published in order on the client's update channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// A request is in flight (initial connect or a reconnect attempt)
    Connecting,
    /// Response headers arrived with 2xx and the body is being read
    Connected,
    /// Not connected; either waiting out a backoff delay or manually stopped
    #[default]
    Disconnected,
    /// Terminal: session expired or reconnect attempts exhausted
    Error,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Whether a connection is open or being opened.
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
