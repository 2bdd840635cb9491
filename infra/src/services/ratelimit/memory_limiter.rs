//! In-process sliding-window rate limiter

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use cg_core::context::RequestContext;
use cg_core::errors::LimitError;
use cg_core::services::RateLimiter;
use cg_shared::config::RateLimitConfig;

/// Rate limiter keeping per-key timestamps in process memory
///
/// Only coordinates callers inside one process.
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    window: Duration,
    capacity: u32,
}

impl MemoryRateLimiter {
    pub fn new(window: Duration, capacity: u32) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window,
            capacity,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.window(), config.capacity)
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn limit(&self, ctx: &RequestContext, key: &str) -> Result<bool, LimitError> {
        ctx.check()?;

        let now = Instant::now();
        let mut windows = self.windows.lock().map_err(|_| LimitError::Store {
            message: "memory rate limiter lock poisoned".to_string(),
            source: None,
        })?;

        for hits in windows.values_mut() {
            while hits
                .front()
                .map_or(false, |at| now.saturating_duration_since(*at) >= self.window)
            {
                hits.pop_front();
            }
        }
        // Keys whose hits all left the window hold no state
        windows.retain(|_, hits| !hits.is_empty());

        let hits = windows.entry(key.to_string()).or_default();

        if hits.len() >= self.capacity as usize {
            return Ok(false);
        }
        hits.push_back(now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_capacity_plus_one_is_throttled() {
        let limiter = MemoryRateLimiter::new(Duration::from_secs(1), 3);
        let ctx = RequestContext::background();

        for _ in 0..3 {
            assert!(limiter.limit(&ctx, "sms:tencent").await.unwrap());
        }
        assert!(!limiter.limit(&ctx, "sms:tencent").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses() {
        let limiter = MemoryRateLimiter::new(Duration::from_secs(1), 2);
        let ctx = RequestContext::background();

        assert!(limiter.limit(&ctx, "sms:tencent").await.unwrap());
        assert!(limiter.limit(&ctx, "sms:tencent").await.unwrap());
        assert!(!limiter.limit(&ctx, "sms:tencent").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.limit(&ctx, "sms:tencent").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = MemoryRateLimiter::new(Duration::from_secs(1), 1);
        let ctx = RequestContext::background();

        assert!(limiter.limit(&ctx, "sms:a").await.unwrap());
        assert!(limiter.limit(&ctx, "sms:b").await.unwrap());
        assert!(!limiter.limit(&ctx, "sms:a").await.unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_context_is_error() {
        let limiter = MemoryRateLimiter::new(Duration::from_secs(1), 1);
        let ctx = RequestContext::background();
        ctx.cancel();
        assert!(matches!(
            limiter.limit(&ctx, "sms:a").await,
            Err(LimitError::Interrupted(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_keys_are_released() {
        let limiter = MemoryRateLimiter::new(Duration::from_secs(1), 5);
        let ctx = RequestContext::background();

        for i in 0..1000 {
            let key = format!("ip:10.0.{}.{}", i / 256, i % 256);
            assert!(limiter.limit(&ctx, &key).await.unwrap());
        }
        assert_eq!(limiter.windows.lock().unwrap().len(), 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(limiter.limit(&ctx, "ip:192.168.0.1").await.unwrap());
        assert_eq!(limiter.windows.lock().unwrap().len(), 1);
    }
}
