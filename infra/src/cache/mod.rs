//! Cache module for Redis-based storage
//!
//! Provides the Redis client and the two code store implementations.

pub mod code_cache;
pub mod memory_code_store;
pub mod redis_client;

pub use code_cache::RedisCodeStore;
pub use memory_code_store::MemoryCodeStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use cg_shared::config::CacheConfig;
