//! Ordered failover: every send walks the list from the first provider

use async_trait::async_trait;
use tracing::{error, info, warn};

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::{SharedSmsProvider, SmsProvider};

use super::provider_names;

/// Tries providers in list order until one succeeds
///
/// Stateless, every call starts from the first provider.
pub struct OrderedFailover {
    name: String,
    providers: Vec<SharedSmsProvider>,
}

impl OrderedFailover {
    pub fn new(providers: Vec<SharedSmsProvider>) -> Self {
        info!(
            providers = %provider_names(&providers),
            "Initializing ordered failover SMS router"
        );
        Self {
            name: "ordered".to_string(),
            providers,
        }
    }
}

#[async_trait]
impl SmsProvider for OrderedFailover {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[String],
        numbers: &[String],
    ) -> Result<(), SmsError> {
        for provider in &self.providers {
            match provider.send(ctx, template_id, args, numbers).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(
                    router = %self.name,
                    provider = provider.name(),
                    error = %e,
                    "SMS provider failed, trying next"
                ),
            }
        }

        error!(
            router = %self.name,
            attempted = self.providers.len(),
            "All SMS providers failed"
        );
        Err(SmsError::AllProvidersFailed {
            attempted: self.providers.len(),
        })
    }
}
