//! # Infrastructure Layer
//!
//! Concrete implementations of the capabilities defined in `cg_core`:
//!
//! - **Cache**: Redis client, Redis-backed code store (server-side Lua) and an
//!   in-process code store with the same atomic semantics
//! - **Rate limiting**: Redis sliding-window limiter and an in-process limiter
//! - **SMS**: memory, Twilio and AWS SNS providers, ordered / rotating /
//!   timeout-switching routers and the rate-limited decorator
//! - **Telemetry**: tracing subscriber setup
//!
//! ## Features
//!
//! - `twilio-sms`: Enable the Twilio provider (default)
//! - `aws-sns`: Enable the AWS SNS provider (default)

// Re-export core types for convenience
pub use cg_core::errors::*;

/// Cache module - Redis client and code stores
pub mod cache;

/// Services module - Infrastructure service implementations
pub mod services;

/// SMS module - Providers, routers and chain assembly
pub mod sms;

/// Telemetry module - tracing subscriber setup
pub mod telemetry;

use cg_shared::config::AppConfig;

/// Load application configuration
///
/// Reads `.env` if present, then layers defaults, the optional TOML file at
/// `path` and `CODEGATE__*` environment variables.
pub fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    AppConfig::load(path).map_err(|e| InfrastructureError::Config(e.to_string()))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS provider initialization error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl From<InfrastructureError> for SmsError {
    fn from(err: InfrastructureError) -> Self {
        SmsError::Config {
            message: err.to_string(),
        }
    }
}
