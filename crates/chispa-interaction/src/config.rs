//! Backend endpoint configuration.
//!
//! Resolution order: `CHISPA_*` environment variables, then the documented
//! local-development defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

/// Backend origin used when `CHISPA_BACKEND_URL` is unset.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
/// Hard per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Base delay before the first retry; doubles on each further attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Connection settings for the tarot backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl BackendConfig {
    /// Loads configuration from environment variables.
    ///
    /// `CHISPA_BACKEND_URL` selects the backend origin; when it is unset the
    /// local-development default is used and a warning is logged. Timeout
    /// and retry knobs are read from `CHISPA_API_TIMEOUT_SECS`,
    /// `CHISPA_API_MAX_RETRIES`, and `CHISPA_API_RETRY_DELAY_MS`.
    pub fn from_env() -> Self {
        let base_url = match env::var("CHISPA_BACKEND_URL") {
            Ok(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => {
                warn!("CHISPA_BACKEND_URL is not set, falling back to {DEFAULT_BACKEND_URL}");
                DEFAULT_BACKEND_URL.to_string()
            }
        };

        Self {
            base_url,
            timeout: env_parse("CHISPA_API_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            max_retries: env_parse("CHISPA_API_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay: env_parse("CHISPA_API_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RETRY_DELAY),
        }
    }

    /// Overrides the backend origin after construction.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Overrides the hard request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overrides the base retry delay.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}
