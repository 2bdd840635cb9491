//! Provider routers
//!
//! Each router holds an ordered list of providers and is itself a provider,
//! so routers compose with the rate-limited decorator and with each other.

mod ordered;
mod rotating;
mod timeout;

pub use ordered::OrderedFailover;
pub use rotating::RotatingFailover;
pub use timeout::{TimeoutFailover, TimeoutFailoverState};

use cg_core::services::SharedSmsProvider;

/// Comma separated provider names for logs
fn provider_names(providers: &[SharedSmsProvider]) -> String {
    providers
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(",")
}
