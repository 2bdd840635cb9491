//! Verification code orchestration
//!
//! Issues a code through the code store, delivers it through the configured
//! provider chain, and validates submitted codes against the store.

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::CodeServiceConfig;
pub use service::CodeService;
pub use types::SendCodeResult;
