//! Configuration for the code service

use std::time::Duration;

use cg_shared::config::CodeConfig;

/// Configuration for the code service
#[derive(Debug, Clone)]
pub struct CodeServiceConfig {
    /// Provider template carrying the code as its only argument
    pub template_id: String,
    /// Lifetime of an issued code
    pub ttl: Duration,
    /// Minimum time before the same scope and phone can get a new code
    pub resend_cooldown: Duration,
}

impl Default for CodeServiceConfig {
    fn default() -> Self {
        Self::from(&CodeConfig::default())
    }
}

impl From<&CodeConfig> for CodeServiceConfig {
    fn from(config: &CodeConfig) -> Self {
        Self {
            template_id: config.template_id.clone(),
            ttl: config.ttl(),
            resend_cooldown: config.resend_cooldown(),
        }
    }
}
