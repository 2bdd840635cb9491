//! Rate limiting capability guarding outbound sends

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::errors::LimitError;

/// Counts actions per key inside a time window shared across processes.
///
/// Window length and capacity belong to the implementation's configuration.
/// The increment and the capacity check must be one atomic operation in the
/// backing store. Whether a `LimitError` allows or denies the action is the
/// caller's decision.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one action for `key` and report whether it fits the window
    async fn limit(&self, ctx: &RequestContext, key: &str) -> Result<bool, LimitError>;
}
