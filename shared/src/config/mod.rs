//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection configuration
//! - `code` - Verification code lifetime, cooldown and attempt budget
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Outbound SMS rate limiting
//! - `sms` - Provider chain composition and vendor credentials

pub mod cache;
pub mod code;
pub mod environment;
pub mod rate_limit;
pub mod sms;

use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use code::CodeConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use sms::{ProviderConfig, RoutingStrategy, SmsConfig};

/// Prefix for environment overrides, e.g. `CODEGATE__CODE__TTL_SECONDS=300`
pub const ENV_PREFIX: &str = "CODEGATE";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Verification code configuration
    #[serde(default)]
    pub code: CodeConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// SMS provider chain configuration
    #[serde(default)]
    pub sms: SmsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            rate_limit: RateLimitConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Load configuration from plain environment variables
    pub fn from_env() -> Result<Self, String> {
        let environment = Environment::from_env();
        let rate_limit = match environment {
            Environment::Development => RateLimitConfig::development(),
            _ => RateLimitConfig::from_env(),
        };
        Ok(Self {
            environment,
            cache: CacheConfig::from_env(),
            code: CodeConfig::from_env(),
            rate_limit,
            sms: SmsConfig::from_env()?,
            logging: LoggingConfig::from_env(),
        })
    }

    /// Load layered configuration: defaults, then an optional TOML file,
    /// then `CODEGATE__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate().map_err(config::ConfigError::Message)?;
        Ok(loaded)
    }

    /// Validate cross-section consistency
    pub fn validate(&self) -> Result<(), String> {
        self.code.validate()?;
        self.sms.validate()?;
        if self.rate_limit.enabled && self.rate_limit.capacity == 0 {
            return Err("rate limit capacity must be at least 1 when enabled".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.code.ttl_seconds, 600);
        assert_eq!(config.code.max_attempts, 3);
        assert_eq!(config.sms.providers.len(), 1);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[code]
ttl_seconds = 300
resend_cooldown_seconds = 30

[sms]
strategy = "timeout"
timeout_threshold = 5

[[sms.providers]]
kind = "memory"
name = "primary"

[[sms.providers]]
kind = "memory"
name = "backup"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.code.ttl_seconds, 300);
        assert_eq!(config.code.resend_threshold_seconds(), 270);
        assert_eq!(config.sms.strategy, RoutingStrategy::Timeout);
        assert_eq!(config.sms.timeout_threshold, 5);
        assert_eq!(config.sms.providers.len(), 2);
        assert_eq!(config.code.template_id, "1877556");
    }

    #[test]
    fn test_load_rejects_inconsistent_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[code]\nttl_seconds = 10\nresend_cooldown_seconds = 20").unwrap();

        assert!(AppConfig::load(Some(file.path())).is_err());
    }
}
