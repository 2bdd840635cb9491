//! Shared utilities and configuration types for CodeGate
//!
//! This crate provides the functionality used across all workspace crates:
//! - Configuration types and loaders
//! - Phone number utilities (normalization, validation, log masking)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CodeConfig, Environment, LogFormat, LoggingConfig, ProviderConfig,
    RateLimitConfig, RoutingStrategy, SmsConfig,
};
pub use utils::phone;
