//! Task API endpoint configuration.
//!
//! This module provides the [`ApiConfig`] type which points the client at
//! the backend's REST root and optionally bounds request time.
//!
//! # Timeouts
//!
//! No timeout is applied by default; the HTTP client's own defaults are
//! used. Setting `timeout_secs` caps each request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Default REST root of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Maximum accepted request timeout (10 minutes).
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Configuration for reaching the task API.
///
/// # Examples
///
/// ```
/// use loanboard_config::ApiConfig;
///
/// let config = ApiConfig::default();
/// assert_eq!(config.base_url, "http://localhost:8000/api/");
/// assert!(config.timeout().is_none());
///
/// let config = ApiConfig::with_base_url("https://loans.example.com/api");
/// assert_eq!(config.url().unwrap().as_str(), "https://loans.example.com/api/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL under which `loan/{id}/tasks/` and `tasks/{id}/` live.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds; `None` keeps the client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Creates a configuration for the given base URL, without timeout.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: None,
        }
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Parses the base URL, normalizing it to end with a slash so relative
    /// endpoint paths join underneath it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse or
    /// is not `http`/`https`.
    pub fn url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme `{other}`"),
            }),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the timeout is zero or
    /// above [`MAX_TIMEOUT_SECS`].
    pub fn validate(&self) -> Result<()> {
        self.url()?;

        match self.timeout_secs {
            Some(0) => Err(ConfigError::InvalidTimeout {
                reason: "timeout must be at least 1 second".to_string(),
            }),
            Some(secs) if secs > MAX_TIMEOUT_SECS => Err(ConfigError::InvalidTimeout {
                reason: format!("timeout {secs} exceeds maximum of {MAX_TIMEOUT_SECS} seconds"),
            }),
            _ => Ok(()),
        }
    }
}
