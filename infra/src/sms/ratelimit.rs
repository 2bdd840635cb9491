//! Rate-limited provider decorator

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::{RateLimiter, SharedSmsProvider, SmsProvider};

/// What to do when the limiter itself fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterFailurePolicy {
    /// Log and send anyway
    FailOpen,
    /// Return `SmsError::LimiterFailure`
    FailClosed,
}

impl LimiterFailurePolicy {
    pub fn from_fail_open(fail_open: bool) -> Self {
        if fail_open {
            LimiterFailurePolicy::FailOpen
        } else {
            LimiterFailurePolicy::FailClosed
        }
    }
}

/// Caps the send volume of a wrapped provider or router
///
/// Every send consumes one slot of `key` before reaching the wrapped target.
pub struct RateLimitedProvider {
    inner: SharedSmsProvider,
    limiter: Arc<dyn RateLimiter>,
    key: String,
    policy: LimiterFailurePolicy,
}

impl RateLimitedProvider {
    pub fn new(
        inner: SharedSmsProvider,
        limiter: Arc<dyn RateLimiter>,
        key: impl Into<String>,
        policy: LimiterFailurePolicy,
    ) -> Self {
        Self {
            inner,
            limiter,
            key: key.into(),
            policy,
        }
    }
}

#[async_trait]
impl SmsProvider for RateLimitedProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[String],
        numbers: &[String],
    ) -> Result<(), SmsError> {
        match self.limiter.limit(ctx, &self.key).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(key = %self.key, provider = self.inner.name(), "SMS send throttled");
                return Err(SmsError::Throttled {
                    key: self.key.clone(),
                });
            }
            Err(e) => match self.policy {
                LimiterFailurePolicy::FailOpen => {
                    warn!(key = %self.key, error = %e, "Rate limiter failed, sending anyway");
                }
                LimiterFailurePolicy::FailClosed => {
                    error!(key = %self.key, error = %e, "Rate limiter failed, rejecting send");
                    return Err(SmsError::LimiterFailure(e));
                }
            },
        }

        self.inner.send(ctx, template_id, args, numbers).await
    }
}
