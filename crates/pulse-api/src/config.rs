//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client can be constructed with zero
//! configuration for local development.

use std::time::Duration;

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the Pulse backend, without a trailing slash.
    /// Env: `PULSE_API_URL`
    /// Default: `http://127.0.0.1:8000/api/v1`
    pub base_url: String,

    /// Per-request timeout.
    /// Env: `PULSE_API_TIMEOUT_SECS`
    /// Default: 30 seconds.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PULSE_API_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(val) = std::env::var("PULSE_API_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.timeout = Duration::from_secs(secs);
            } else {
                tracing::warn!(value = %val, "Invalid PULSE_API_TIMEOUT_SECS, using default");
            }
        }

        config
    }
}
