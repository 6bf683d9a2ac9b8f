//! Streaming-related error types.
//!
//! Errors raised while holding the job event stream open.

use thiserror::Error;

use crate::traits::HttpError;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The request never produced a response.
    #[error("Failed to open event stream: {message}")]
    ConnectionFailed { message: String },

    /// Non-2xx response other than 401.
    #[error("Event stream returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// 2xx response without a body to read.
    #[error("Event stream response had no body")]
    MissingBody,

    /// Reading the body failed mid-stream.
    #[error("Event stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// The server ended the body without being asked to.
    #[error("Event stream closed by server")]
    ServerClosed,

    /// HTTP 401; the session must be re-established upstream.
    #[error("Session expired")]
    Unauthorized,

    /// Error reported by the server as an `error` event.
    #[error("Server error: {message}")]
    Server {
        message: String,
        details: Option<String>,
    },

    /// Reconnection was abandoned after too many consecutive failures.
    #[error("Gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },
}

impl StreamError {
    /// Whether this failure is handled by the reconnect policy.
    pub fn should_reconnect(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionFailed { .. }
                | StreamError::HttpStatus { .. }
                | StreamError::MissingBody
                | StreamError::ConnectionLost { .. }
                | StreamError::ServerClosed
        )
    }

    pub fn is_retryable(&self) -> bool {
        self.should_reconnect()
    }

    /// Whether this error ends the stream for good.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamError::Unauthorized | StreamError::ReconnectExhausted { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionFailed { .. }
            | StreamError::ConnectionLost { .. }
            | StreamError::ServerClosed
            | StreamError::MissingBody => {
                "Connection to job updates was lost. Reconnecting...".to_string()
            }
            StreamError::HttpStatus { status } => {
                format!("Job updates are unavailable (HTTP {}). Reconnecting...", status)
            }
            StreamError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            StreamError::Server { message, details } => match details {
                Some(details) => format!("{} ({})", message, details),
                None => message.clone(),
            },
            StreamError::ReconnectExhausted { .. } => {
                "Unable to reach the server for job updates. Try reconnecting manually.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionFailed { .. } => "E_STREAM_CONN",
            StreamError::HttpStatus { .. } => "E_STREAM_HTTP",
            StreamError::MissingBody => "E_STREAM_NO_BODY",
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
            StreamError::ServerClosed => "E_STREAM_CLOSED",
            StreamError::Unauthorized => "E_STREAM_AUTH",
            StreamError::Server { .. } => "E_STREAM_SERVER",
            StreamError::ReconnectExhausted { .. } => "E_STREAM_EXHAUSTED",
        }
    }
}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status: 401, .. } => StreamError::Unauthorized,
            HttpError::ServerError { status, .. } => StreamError::HttpStatus { status },
            HttpError::Io(message) => StreamError::ConnectionLost { message },
            other => StreamError::ConnectionFailed {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_classification() {
        assert!(StreamError::ServerClosed.should_reconnect());
        assert!(StreamError::MissingBody.should_reconnect());
        assert!(StreamError::HttpStatus { status: 502 }.should_reconnect());
        assert!(!StreamError::Unauthorized.should_reconnect());
        assert!(!StreamError::ReconnectExhausted { attempts: 10 }.should_reconnect());
        assert!(!StreamError::Server {
            message: "x".to_string(),
            details: None
        }
        .should_reconnect());
    }

    #[test]
    fn test_terminal_errors() {
        assert!(StreamError::Unauthorized.is_terminal());
        assert!(StreamError::ReconnectExhausted { attempts: 10 }.is_terminal());
        assert!(!StreamError::ServerClosed.is_terminal());
    }

    #[test]
    fn test_from_http_error() {
        let err: StreamError = HttpError::ServerError {
            status: 401,
            message: String::new(),
        }
        .into();
        assert_eq!(err, StreamError::Unauthorized);

        let err: StreamError = HttpError::ServerError {
            status: 500,
            message: String::new(),
        }
        .into();
        assert_eq!(err, StreamError::HttpStatus { status: 500 });

        let err: StreamError = HttpError::ConnectionFailed("refused".to_string()).into();
        assert!(matches!(err, StreamError::ConnectionFailed { .. }));
    }

    #[test]
    fn test_server_error_user_message_includes_details() {
        let err = StreamError::Server {
            message: "Connector offline".to_string(),
            details: Some("gmail".to_string()),
        };
        assert_eq!(err.user_message(), "Connector offline (gmail)");
        assert_eq!(err.error_code(), "E_STREAM_SERVER");
    }
}
