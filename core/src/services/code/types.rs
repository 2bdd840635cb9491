//! Types for code service results

use chrono::{DateTime, Utc};

/// Result of issuing and delivering a code
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    pub scope: String,
    /// When the store drops the code if it is never used
    pub expires_at: DateTime<Utc>,
    /// When the caller may request another code
    pub next_resend_at: DateTime<Utc>,
}
