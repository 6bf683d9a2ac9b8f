//! Error handling for the synchronization core.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: stream, fetch and configuration errors
//! - **Unified Error Type**: `SyncError` consolidates them
//! - **Result Type Alias**: `SyncResult<T>`
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection drops, timeouts | Yes |
//! | Auth | Session expired (HTTP 401) | No |
//! | Server | 5xx, in-stream server errors | Yes |
//! | Client | Malformed payloads | No |
//! | Configuration | Bad base URL or settings | No |

mod category;
mod config;
mod fetch;
mod result;
mod stream;
mod sync_error;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use fetch::FetchError;
pub use result::SyncResult;
pub use stream::StreamError;
pub use sync_error::SyncError;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::traits::HttpError;

    #[test]
    fn test_error_unification() {
        let stream_err: SyncError = StreamError::ConnectionLost {
            message: "reset".to_string(),
        }
        .into();
        let fetch_err: SyncError = FetchError::Unauthorized.into();
        let config_err: SyncError = ConfigError::InvalidUrl {
            url: "::".to_string(),
            message: "relative URL without a base".to_string(),
        }
        .into();

        assert_eq!(stream_err.category(), ErrorCategory::Network);
        assert_eq!(fetch_err.category(), ErrorCategory::Auth);
        assert_eq!(config_err.category(), ErrorCategory::Configuration);

        for err in [&stream_err, &fetch_err, &config_err] {
            assert!(!err.error_code().is_empty());
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_reauth_detection() {
        let reauth: Vec<SyncError> = vec![
            StreamError::Unauthorized.into(),
            FetchError::Unauthorized.into(),
            HttpError::ServerError {
                status: 401,
                message: "Unauthorized".to_string(),
            }
            .into(),
        ];
        for err in reauth {
            assert!(err.requires_reauth(), "Expected {:?} to require reauth", err);
            assert!(!err.is_retryable());
        }

        let no_reauth: SyncError = HttpError::ServerError {
            status: 503,
            message: "Unavailable".to_string(),
        }
        .into();
        assert!(!no_reauth.requires_reauth());
        assert!(no_reauth.is_retryable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SyncError = json_err.into();
        assert_eq!(err.category(), ErrorCategory::Client);
    }
}
