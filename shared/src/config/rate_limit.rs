//! Rate limiting configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outbound SMS rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting of the provider chain
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Limiter key identifying the guarded target
    #[serde(default = "default_key")]
    pub key: String,

    /// Window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Actions allowed per window
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Send anyway when the limiter itself fails
    #[serde(default)]
    pub fail_open: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            key: default_key(),
            window_seconds: default_window_seconds(),
            capacity: default_capacity(),
            fail_open: false,
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("SMS_RATE_LIMIT_ENABLED").unwrap_or(defaults.enabled),
            key: std::env::var("SMS_RATE_LIMIT_KEY").unwrap_or(defaults.key),
            window_seconds: env_parse("SMS_RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or(defaults.window_seconds),
            capacity: env_parse("SMS_RATE_LIMIT_CAPACITY").unwrap_or(defaults.capacity),
            fail_open: env_parse("SMS_RATE_LIMIT_FAIL_OPEN").unwrap_or(defaults.fail_open),
        }
    }

    /// Window length
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            capacity: 1000,
            fail_open: true,
            ..Default::default()
        }
    }

    /// Create a production configuration (stricter limits)
    pub fn production() -> Self {
        Self::default()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn default_enabled() -> bool {
    true
}

fn default_key() -> String {
    String::from("sms:provider")
}

fn default_window_seconds() -> u64 {
    1
}

fn default_capacity() -> u32 {
    100
}
