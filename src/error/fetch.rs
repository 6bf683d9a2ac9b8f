//! Message fetch error types.

use thiserror::Error;

use crate::traits::HttpError;

/// Failure of one message-list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP 401 from the thread-state service. Never retried.
    #[error("Session expired")]
    Unauthorized,

    /// The fetch was aborted by its owner.
    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Message fetch failed: {0}")]
    Http(HttpError),

    #[error("Invalid message payload: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether another try may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Http(_) | FetchError::Decode(_))
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status: 401, .. } => FetchError::Unauthorized,
            HttpError::Cancelled => FetchError::Cancelled,
            other => FetchError::Http(other),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
