//! Verification code configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Verification code lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodeConfig {
    /// Lifetime of a code in the store, in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Minimum seconds between two codes for the same scope and phone
    #[serde(default = "default_resend_cooldown_seconds")]
    pub resend_cooldown_seconds: u64,

    /// Verification attempts allowed per issued code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Provider template used to deliver the code
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Key namespace for stored codes
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            resend_cooldown_seconds: default_resend_cooldown_seconds(),
            max_attempts: default_max_attempts(),
            template_id: default_template_id(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl CodeConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_seconds: env_parse("CODE_TTL_SECONDS").unwrap_or(defaults.ttl_seconds),
            resend_cooldown_seconds: env_parse("CODE_RESEND_COOLDOWN_SECONDS")
                .unwrap_or(defaults.resend_cooldown_seconds),
            max_attempts: env_parse("CODE_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts),
            template_id: std::env::var("CODE_TEMPLATE_ID").unwrap_or(defaults.template_id),
            key_prefix: defaults.key_prefix,
        }
    }

    /// Code lifetime
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Resend cooldown
    pub fn resend_cooldown(&self) -> Duration {
        Duration::from_secs(self.resend_cooldown_seconds)
    }

    /// Remaining TTL at or below which a new code may replace the current one
    pub fn resend_threshold_seconds(&self) -> u64 {
        self.ttl_seconds.saturating_sub(self.resend_cooldown_seconds)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_seconds == 0 {
            return Err("code ttl must be positive".to_string());
        }
        if self.resend_cooldown_seconds > self.ttl_seconds {
            return Err(format!(
                "resend cooldown ({}s) cannot exceed code ttl ({}s)",
                self.resend_cooldown_seconds, self.ttl_seconds
            ));
        }
        if self.max_attempts == 0 {
            return Err("max attempts must be at least 1".to_string());
        }
        if self.template_id.is_empty() {
            return Err("template id is required".to_string());
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn default_ttl_seconds() -> u64 {
    600 // 10 minutes
}

fn default_resend_cooldown_seconds() -> u64 {
    60 // 1 minute
}

fn default_max_attempts() -> u32 {
    3
}

fn default_template_id() -> String {
    String::from("1877556")
}

fn default_key_prefix() -> String {
    String::from("phone_code")
}
