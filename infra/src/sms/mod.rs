//! SMS Module
//!
//! Concrete providers, the provider routers and the rate-limited decorator,
//! plus assembly of a provider chain from configuration.
//!
//! ## Providers
//!
//! - **Memory**: logs and records messages (development, tests)
//! - **Twilio**: Twilio Messages API (`twilio-sms` feature)
//! - **AWS SNS**: direct SMS publish (`aws-sns` feature)

use std::sync::Arc;

use tracing::{info, warn};

use cg_core::services::{RateLimiter, SharedSmsProvider};
use cg_shared::config::{ProviderConfig, RateLimitConfig, RoutingStrategy, SmsConfig};

pub mod failover;
pub mod memory;
pub mod message;
pub mod ratelimit;

// Twilio SMS provider (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

// AWS SNS SMS provider (feature-gated)
#[cfg(feature = "aws-sns")]
pub mod aws_sns;

// Re-export commonly used types
pub use failover::{OrderedFailover, RotatingFailover, TimeoutFailover, TimeoutFailoverState};
pub use memory::{Delivery, MemorySmsProvider};
pub use ratelimit::{LimiterFailurePolicy, RateLimitedProvider};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsProvider};

#[cfg(feature = "aws-sns")]
pub use aws_sns::{AwsSnsConfig, AwsSnsSmsProvider};

use crate::InfrastructureError;

#[cfg(test)]
mod tests;

/// Create a single provider from its configuration
pub async fn create_provider(
    config: &ProviderConfig,
) -> Result<SharedSmsProvider, InfrastructureError> {
    match config {
        ProviderConfig::Memory { name } => Ok(Arc::new(MemorySmsProvider::new(name.clone()))),
        #[cfg(feature = "twilio-sms")]
        ProviderConfig::Twilio { .. } => {
            let provider = TwilioSmsProvider::new(TwilioConfig::try_from(config)?)?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "aws-sns")]
        ProviderConfig::AwsSns { .. } => {
            let provider = AwsSnsSmsProvider::new(AwsSnsConfig::try_from(config)?).await?;
            Ok(Arc::new(provider))
        }
        #[allow(unreachable_patterns)]
        other => Err(InfrastructureError::Config(format!(
            "SMS provider '{}' is not enabled in this build",
            other.kind()
        ))),
    }
}

/// Assemble the provider chain described by `config`
///
/// The providers are combined according to the routing strategy and, when
/// rate limiting is enabled, the whole chain is wrapped by the rate-limited
/// decorator using `limiter`.
///
/// # Arguments
///
/// * `config` - Providers and routing strategy
/// * `rate_limit` - Decorator key, failure policy and on/off switch
/// * `limiter` - Limiter backing the decorator
pub async fn build_sms_chain(
    config: &SmsConfig,
    rate_limit: &RateLimitConfig,
    limiter: Arc<dyn RateLimiter>,
) -> Result<SharedSmsProvider, InfrastructureError> {
    config.validate().map_err(InfrastructureError::Config)?;

    let mut providers = Vec::with_capacity(config.providers.len());
    for provider_config in &config.providers {
        providers.push(create_provider(provider_config).await?);
    }

    let chain = route(config.strategy, config.timeout_threshold, providers)?;

    info!(
        strategy = ?config.strategy,
        providers = config.providers.len(),
        rate_limited = rate_limit.enabled,
        "SMS provider chain assembled"
    );

    if !rate_limit.enabled {
        return Ok(chain);
    }

    Ok(Arc::new(RateLimitedProvider::new(
        chain,
        limiter,
        rate_limit.key.clone(),
        LimiterFailurePolicy::from_fail_open(rate_limit.fail_open),
    )))
}

/// Combine already constructed providers with a routing strategy
pub fn route(
    strategy: RoutingStrategy,
    timeout_threshold: u32,
    mut providers: Vec<SharedSmsProvider>,
) -> Result<SharedSmsProvider, InfrastructureError> {
    if providers.is_empty() {
        return Err(InfrastructureError::Config(
            "at least one SMS provider must be configured".to_string(),
        ));
    }

    let chain: SharedSmsProvider = match strategy {
        RoutingStrategy::Single => {
            if providers.len() > 1 {
                warn!(
                    configured = providers.len(),
                    "Single SMS strategy uses only the first provider"
                );
            }
            providers.swap_remove(0)
        }
        RoutingStrategy::Ordered => Arc::new(OrderedFailover::new(providers)),
        RoutingStrategy::Rotating => Arc::new(RotatingFailover::new(providers)),
        RoutingStrategy::Timeout => Arc::new(TimeoutFailover::new(providers, timeout_threshold)),
    };
    Ok(chain)
}
