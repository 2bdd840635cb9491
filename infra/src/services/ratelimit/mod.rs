//! Rate limiter implementations guarding the send path

pub mod memory_limiter;
pub mod redis_limiter;

pub use memory_limiter::MemoryRateLimiter;
pub use redis_limiter::RedisRateLimiter;
