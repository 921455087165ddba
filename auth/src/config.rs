//! Verification backend configuration.
//!
//! Values come from the application (usually the environment), not from
//! hardcoded call sites.

use crate::constants::{env_vars, DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL};
use std::env;
use std::time::Duration;

/// REST API configuration for the verification backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the API (e.g., `https://api.crowdbolt.com`).
    ///
    /// Endpoint paths are appended to it; a trailing slash is tolerated.
    pub base_url: String,

    /// Timeout applied to each request.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create configuration for the given base URL with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// - `CROWDBOLT_API_URL` (default `http://localhost:8000`)
    /// - `CROWDBOLT_API_TIMEOUT_SECS` (default 10; unparseable values fall back)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = get(env_vars::API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = get(env_vars::API_TIMEOUT_SECS)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        Self::new(base_url).with_request_timeout(Duration::from_secs(timeout_secs))
    }

    /// Full URL for an endpoint path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::endpoints;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_reads_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("CROWDBOLT_API_URL", "https://api.crowdbolt.test"),
            ("CROWDBOLT_API_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.base_url, "https://api.crowdbolt.test");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_or_empty_values_fall_back() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("CROWDBOLT_API_URL", "  "),
            ("CROWDBOLT_API_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ApiConfig::new("http://localhost:8000/");
        assert_eq!(
            config.endpoint(endpoints::SEND_CODE),
            "http://localhost:8000/api/auth/phone/send-code/"
        );
    }
}
