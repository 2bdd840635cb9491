//! Infrastructure service implementations

pub mod ratelimit;

pub use ratelimit::{MemoryRateLimiter, RedisRateLimiter};
