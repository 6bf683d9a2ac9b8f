//! Unified error type for the synchronization core.

use thiserror::Error;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::fetch::FetchError;
use super::stream::StreamError;
use crate::traits::HttpError;

/// Unified error type.
///
/// Component-internal failures are absorbed by their owners; this type is
/// what crosses a component boundary or reaches the binary.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        if self.requires_reauth() {
            return ErrorCategory::Auth;
        }
        match self {
            SyncError::Http(HttpError::ServerError { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            SyncError::Http(HttpError::ServerError { .. }) => ErrorCategory::Client,
            SyncError::Http(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            SyncError::Http(_) => ErrorCategory::Network,
            SyncError::Stream(StreamError::Server { .. })
            | SyncError::Stream(StreamError::HttpStatus { .. }) => ErrorCategory::Server,
            SyncError::Stream(_) => ErrorCategory::Network,
            SyncError::Fetch(FetchError::Decode(_)) => ErrorCategory::Client,
            SyncError::Fetch(_) => ErrorCategory::Network,
            SyncError::Config(_) => ErrorCategory::Configuration,
            SyncError::Json(_) => ErrorCategory::Client,
        }
    }

    /// Whether the user has to sign in again.
    pub fn requires_reauth(&self) -> bool {
        match self {
            SyncError::Http(err) => err.is_unauthorized(),
            SyncError::Stream(err) => *err == StreamError::Unauthorized,
            SyncError::Fetch(err) => *err == FetchError::Unauthorized,
            _ => false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Stream(err) => err.is_retryable(),
            SyncError::Fetch(err) => err.is_retryable(),
            SyncError::Http(HttpError::Cancelled) => false,
            _ => self.category().is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Stream(err) => err.user_message(),
            _ if self.requires_reauth() => {
                "Your session has expired. Please sign in again.".to_string()
            }
            SyncError::Fetch(_) | SyncError::Http(_) => {
                "Couldn't reach the server. Please try again.".to_string()
            }
            SyncError::Config(err) => format!("Configuration problem: {}", err),
            SyncError::Json(_) => "Received invalid data from the server.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Http(_) => "E_HTTP",
            SyncError::Stream(err) => err.error_code(),
            SyncError::Fetch(FetchError::Unauthorized) => "E_FETCH_AUTH",
            SyncError::Fetch(_) => "E_FETCH",
            SyncError::Config(_) => "E_CONFIG",
            SyncError::Json(_) => "E_JSON",
        }
    }
}
