//! Runtime configuration.
//!
//! Use the builder methods to customize, or [`SyncConfig::from_env`] to pick
//! up overrides from the environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `SESSION_SYNC_API_URL` | explicit API base URL (wins over everything) |
//! | `SESSION_SYNC_ORIGIN` | origin whose port is swapped for the API port |
//! | `SESSION_SYNC_API_PORT` | API port (default 8000) |
//! | `SESSION_SYNC_COOKIE` | session cookie sent with every request |

use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::jobs::ReconnectPolicy;
use crate::messages::RetryPolicy;

pub const DEFAULT_API_PORT: u16 = 8000;

/// Configuration shared by the synchronization components.
///
/// # Example
///
/// ```ignore
/// use session_sync::config::SyncConfig;
///
/// let config = SyncConfig::default()
///     .with_base_url("http://localhost:8000")
///     .with_session_cookie("session=abc");
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    /// Cookie header value sent with every request
    pub session_cookie: Option<String>,
    pub reconnect: ReconnectPolicy,
    pub fetch_retry: RetryPolicy,
    /// Delay before a signalled refetch, absorbing read-after-write lag
    pub refetch_delay: Duration,
    /// How long after starting a resume an error still triggers fallback
    pub resume_window: Duration,
    /// Pause between clearing the thread and re-submitting on fallback
    pub fallback_delay: Duration,
    /// Capacity of the broadcast channels components publish on
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{}", DEFAULT_API_PORT),
            session_cookie: None,
            reconnect: ReconnectPolicy::default(),
            fetch_retry: RetryPolicy::default(),
            refetch_delay: Duration::from_millis(100),
            resume_window: Duration::from_secs(12),
            fallback_delay: Duration::from_millis(50),
            channel_capacity: 256,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL. A trailing slash is stripped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_fetch_retry(mut self, policy: RetryPolicy) -> Self {
        self.fetch_retry = policy;
        self
    }

    pub fn with_refetch_delay(mut self, delay: Duration) -> Self {
        self.refetch_delay = delay;
        self
    }

    pub fn with_resume_window(mut self, window: Duration) -> Self {
        self.resume_window = window;
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Build a config from `SESSION_SYNC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_port = match lookup("SESSION_SYNC_API_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "SESSION_SYNC_API_PORT",
                value: raw,
            })?,
            None => DEFAULT_API_PORT,
        };
        let origin = lookup("SESSION_SYNC_ORIGIN");
        let override_url = lookup("SESSION_SYNC_API_URL");
        let base_url = resolve_base_url(origin.as_deref(), api_port, override_url.as_deref())?;

        let mut config = Self::default().with_base_url(base_url);
        if let Some(cookie) = lookup("SESSION_SYNC_COOKIE").filter(|c| !c.is_empty()) {
            config = config.with_session_cookie(cookie);
        }
        Ok(config)
    }
}

/// Resolve the API base URL.
///
/// An explicit override wins; otherwise the origin is reused with its port
/// replaced by `api_port`; with neither, `http://localhost:<api_port>`.
/// The result never ends with a slash.
pub fn resolve_base_url(
    origin: Option<&str>,
    api_port: u16,
    override_url: Option<&str>,
) -> Result<String, ConfigError> {
    if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        return Ok(parsed.as_str().trim_end_matches('/').to_string());
    }

    let origin = match origin.map(str::trim).filter(|o| !o.is_empty()) {
        Some(origin) => origin,
        None => return Ok(format!("http://localhost:{}", api_port)),
    };

    let mut url = Url::parse(origin).map_err(|e| ConfigError::InvalidUrl {
        url: origin.to_string(),
        message: e.to_string(),
    })?;
    url.set_port(Some(api_port))
        .map_err(|_| ConfigError::InvalidUrl {
            url: origin.to_string(),
            message: "origin cannot carry a port".to_string(),
        })?;
    url.set_path("");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.refetch_delay, Duration::from_millis(100));
        assert_eq!(config.resume_window, Duration::from_secs(12));
        assert_eq!(config.fallback_delay, Duration::from_millis(50));
        assert_eq!(config.reconnect.max_attempts, 10);
        assert_eq!(config.fetch_retry.max_attempts, 4);
    }

    #[test]
    fn test_channel_capacity_is_at_least_one() {
        assert_eq!(SyncConfig::new().with_channel_capacity(0).channel_capacity, 1);
        assert_eq!(SyncConfig::new().with_channel_capacity(8).channel_capacity, 8);
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let config = SyncConfig::new().with_base_url("https://api.example.com/v1/");
        assert_eq!(config.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn test_resolve_swaps_origin_port() {
        let url = resolve_base_url(Some("http://app.example.com:3000/cases/12"), 8000, None).unwrap();
        assert_eq!(url, "http://app.example.com:8000");
    }

    #[test]
    fn test_resolve_origin_without_port() {
        let url = resolve_base_url(Some("https://app.example.com"), 8443, None).unwrap();
        assert_eq!(url, "https://app.example.com:8443");
    }

    #[test]
    fn test_resolve_override_wins() {
        let url = resolve_base_url(
            Some("http://app.example.com:3000"),
            8000,
            Some("https://api.example.com/"),
        )
        .unwrap();
        assert_eq!(url, "https://api.example.com");
    }

    #[test]
    fn test_resolve_blank_override_ignored() {
        let url = resolve_base_url(None, 9000, Some("  ")).unwrap();
        assert_eq!(url, "http://localhost:9000");
    }

    #[test]
    fn test_resolve_invalid_override() {
        let err = resolve_base_url(None, 8000, Some("not a url")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SESSION_SYNC_ORIGIN", "http://localhost:5173"),
            ("SESSION_SYNC_API_PORT", "8080"),
            ("SESSION_SYNC_COOKIE", "session=abc"),
        ]
        .into_iter()
        .collect();
        let config = SyncConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.session_cookie.as_deref(), Some("session=abc"));
    }

    #[test]
    fn test_from_lookup_bad_port() {
        let err = SyncConfig::from_lookup(|k| {
            (k == "SESSION_SYNC_API_PORT").then(|| "eighty".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "SESSION_SYNC_API_PORT",
                value: "eighty".to_string()
            }
        );
    }
}
