//! Business services containing domain logic and use cases.

pub mod code;
pub mod ratelimit;
pub mod sms;

// Re-export commonly used types
pub use code::{CodeService, CodeServiceConfig, SendCodeResult};
pub use ratelimit::RateLimiter;
pub use sms::{SharedSmsProvider, SmsProvider};
