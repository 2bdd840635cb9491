//! Verification code entity and the key layout shared by every code store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Exclusive upper bound of the numeric code space
const CODE_SPACE: u32 = 1_000_000;

/// Suffix of the sibling key holding the remaining attempt budget
pub const ATTEMPTS_KEY_SUFFIX: &str = "cnt";

/// A one-time code issued for a (scope, phone) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Business scope the code was issued for (e.g. "login")
    pub scope: String,

    /// Recipient phone number
    pub phone: String,

    /// The zero-padded 6-digit value
    pub value: String,

    /// Timestamp when the code was created
    pub created_at: DateTime<Utc>,

    /// Lifetime enforced by the backing store
    pub ttl: Duration,
}

impl VerificationCode {
    /// Issue a fresh code with a uniformly random value
    ///
    /// # Arguments
    ///
    /// * `scope` - Business scope tag namespacing the code
    /// * `phone` - Recipient phone number
    /// * `ttl` - How long the store keeps the code alive
    pub fn issue(scope: impl Into<String>, phone: impl Into<String>, ttl: Duration) -> Self {
        Self {
            scope: scope.into(),
            phone: phone.into(),
            value: Self::generate_value(),
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Generate a value uniformly over 000000..=999999
    pub fn generate_value() -> String {
        let mut rng = rand::thread_rng();
        let value: u32 = rng.gen_range(0..CODE_SPACE);
        format!("{:0width$}", value, width = CODE_LENGTH)
    }

    /// When the store will drop the code if nothing consumes it first
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero())
    }

    /// Storage key of this code
    pub fn key(&self, prefix: &str) -> String {
        code_key(prefix, &self.scope, &self.phone)
    }
}

/// Build the namespaced storage key `<prefix>:<scope>:<phone>`
pub fn code_key(prefix: &str, scope: &str, phone: &str) -> String {
    format!("{}:{}:{}", prefix, scope, phone)
}

/// Sibling key of `code_key` holding the attempt counter
pub fn attempts_key(code_key: &str) -> String {
    format!("{}:{}", code_key, ATTEMPTS_KEY_SUFFIX)
}
