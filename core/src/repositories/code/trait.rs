//! Code store trait owning the lifecycle of one verification code per
//! (scope, phone) pair.
//!
//! Implementations must make both operations a single atomic step against
//! the backing store. Two concurrent `set` calls for the same pair must not
//! both succeed, and two concurrent `verify` calls must each consume one
//! attempt. Stores never retry internally.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::errors::CodeError;

/// Repository trait for verification code persistence
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `code` for `(scope, phone)` with a fresh TTL and attempt budget.
    ///
    /// Fails with `TooManyRequests` while the live code is inside its resend
    /// cooldown, leaving it untouched. A live key without a TTL is reported
    /// as `System`.
    async fn set(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        code: &str,
    ) -> Result<(), CodeError>;

    /// Consume one attempt and compare `input` with the live code.
    ///
    /// Returns `Ok(true)` exactly once per issued code (the code is deleted),
    /// `Ok(false)` on mismatch, `TooManyAttempts` once the budget is spent
    /// (regardless of `input`), and `NotFound` when no live code exists.
    async fn verify(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> Result<bool, CodeError>;
}
