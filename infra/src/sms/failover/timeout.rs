//! Timeout failover: stick to one provider, move on after repeated timeouts
//!
//! The active slot and the consecutive timeout count are shared by every
//! caller of one router. The switch is a compare-and-swap on the slot; only
//! the caller that wins the swap resets the count, losers pick up the slot
//! the winner chose. Only `DeadlineExceeded` counts as a timeout, other
//! errors leave the count untouched.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::{SharedSmsProvider, SmsProvider};

use super::provider_names;

/// Snapshot of the router's shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutFailoverState {
    pub active_index: usize,
    pub consecutive_timeouts: u32,
}

/// Routes every send to the active provider and switches to the next one
/// once `threshold` consecutive timeouts were observed
pub struct TimeoutFailover {
    name: String,
    providers: Vec<SharedSmsProvider>,
    threshold: u32,
    active: AtomicUsize,
    timeouts: AtomicU32,
}

impl TimeoutFailover {
    /// A threshold of 0 is treated as 1
    pub fn new(providers: Vec<SharedSmsProvider>, threshold: u32) -> Self {
        info!(
            providers = %provider_names(&providers),
            threshold = threshold,
            "Initializing timeout failover SMS router"
        );
        Self {
            name: "timeout".to_string(),
            providers,
            threshold: threshold.max(1),
            active: AtomicUsize::new(0),
            timeouts: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> TimeoutFailoverState {
        TimeoutFailoverState {
            active_index: self.active.load(Ordering::SeqCst),
            consecutive_timeouts: self.timeouts.load(Ordering::SeqCst),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_state(&self, active_index: usize, consecutive_timeouts: u32) {
        self.active.store(active_index, Ordering::SeqCst);
        self.timeouts.store(consecutive_timeouts, Ordering::SeqCst);
    }

    /// Slot to use for this call, switching first when the threshold is reached
    fn select(&self, len: usize) -> usize {
        let index = self.active.load(Ordering::SeqCst);
        let timeouts = self.timeouts.load(Ordering::SeqCst);
        if timeouts < self.threshold {
            return index % len;
        }

        let candidate = (index + 1) % len;
        match self
            .active
            .compare_exchange(index, candidate, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {
                self.timeouts.store(0, Ordering::SeqCst);
                warn!(
                    router = %self.name,
                    from = self.providers[index % len].name(),
                    to = self.providers[candidate].name(),
                    consecutive_timeouts = timeouts,
                    "Switching SMS provider after consecutive timeouts"
                );
                candidate
            }
            Err(current) => current % len,
        }
    }
}

#[async_trait]
impl SmsProvider for TimeoutFailover {
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

        let index = self.select(len);
        let provider = &self.providers[index];

        match provider.send(ctx, template_id, args, numbers).await {
            Ok(()) => {
                self.timeouts.store(0, Ordering::SeqCst);
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                let timeouts = self.timeouts.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(
                    router = %self.name,
                    provider = provider.name(),
                    consecutive_timeouts = timeouts,
                    "SMS provider timed out"
                );
                Err(e)
            }
            Err(e) => {
                warn!(
                    router = %self.name,
                    provider = provider.name(),
                    error = %e,
                    "SMS provider failed"
                );
                Err(e)
            }
        }
    }
}
