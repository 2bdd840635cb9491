//! # CodeGate Core
//!
//! Domain layer for one-time verification codes: the code entity and key
//! layout, the error taxonomy, request deadlines and cancellation, the
//! capability traits implemented by infrastructure (code store, rate
//! limiter, SMS provider) and the code service orchestrating them.

pub mod context;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use context::{Interrupted, RequestContext};
pub use domain::{code_key, VerificationCode};
pub use errors::{CodeError, DomainError, DomainResult, LimitError, SmsError};
pub use repositories::CodeStore;
pub use services::{CodeService, CodeServiceConfig, RateLimiter, SharedSmsProvider, SmsProvider};
