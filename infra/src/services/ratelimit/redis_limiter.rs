//! Redis sliding-window rate limiter
//!
//! Pruning, counting and recording run in one Lua script using the Redis
//! server clock, so every process sharing the key sees the same window.

use std::time::Duration;

use async_trait::async_trait;
use redis::Script;
use tracing::debug;
use uuid::Uuid;

use cg_core::context::RequestContext;
use cg_core::errors::LimitError;
use cg_core::services::RateLimiter;
use cg_shared::config::RateLimitConfig;

use crate::cache::RedisClient;

const SLIDING_WINDOW_SCRIPT: &str = include_str!("lua/sliding_window.lua");

/// Redis-based implementation of the rate limiter trait
pub struct RedisRateLimiter {
    client: RedisClient,
    window: Duration,
    capacity: u32,
    script: Script,
}

impl RedisRateLimiter {
    /// Create a limiter admitting `capacity` actions per `window` and key
    pub fn new(client: RedisClient, window: Duration, capacity: u32) -> Self {
        Self {
            client,
            window,
            capacity,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        }
    }

    pub fn from_config(client: RedisClient, config: &RateLimitConfig) -> Self {
        Self::new(client, config.window(), config.capacity)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn limit(&self, ctx: &RequestContext, key: &str) -> Result<bool, LimitError> {
        let window_key = self.client.key(&format!("rate_limit:{}", key));
        let window_ms = u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX);

        let mut invocation = self.script.prepare_invoke();
        invocation
            .key(&window_key)
            .arg(window_ms)
            .arg(self.capacity)
            .arg(Uuid::new_v4().to_string());

        let allowed: i64 = self
            .client
            .invoke(ctx, &invocation, |e| {
                LimitError::store("failed to run sliding window script", e)
            })
            .await?;

        if allowed == 0 {
            debug!(key = key, capacity = self.capacity, "Rate limit exceeded");
        }
        Ok(allowed == 1)
    }
}
