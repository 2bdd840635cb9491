//! Rotating failover: each send starts one provider further along

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{error, info, warn};

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::{SharedSmsProvider, SmsProvider};

use super::provider_names;

/// Spreads sends across providers by rotating the starting offset
///
/// Cancellation and deadline errors stop the rotation immediately.
pub struct RotatingFailover {
    name: String,
    providers: Vec<SharedSmsProvider>,
    next: AtomicU64,
}

impl RotatingFailover {
    pub fn new(providers: Vec<SharedSmsProvider>) -> Self {
        info!(
            providers = %provider_names(&providers),
            "Initializing rotating failover SMS router"
        );
        Self {
            name: "rotating".to_string(),
            providers,
            next: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl SmsProvider for RotatingFailover {
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
        let len = self.providers.len();
        if len == 0 {
            return Err(SmsError::AllProvidersFailed { attempted: 0 });
        }

        let offset = (self.next.fetch_add(1, Ordering::Relaxed) % len as u64) as usize;

        for i in 0..len {
            let provider = &self.providers[(offset + i) % len];
            match provider.send(ctx, template_id, args, numbers).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_terminal() => {
                    warn!(
                        router = %self.name,
                        provider = provider.name(),
                        error = %e,
                        "SMS send interrupted, stopping rotation"
                    );
                    return Err(e);
                }
                Err(e) => warn!(
                    router = %self.name,
                    provider = provider.name(),
                    error = %e,
                    "SMS provider failed, trying next"
                ),
            }
        }

        error!(router = %self.name, attempted = len, "All SMS providers failed");
        Err(SmsError::AllProvidersFailed { attempted: len })
    }
}
