//! In-process code store
//!
//! Emulates the Redis scripts with one short critical section per call.
//! Expiry uses `tokio::time::Instant`, so tests can drive it with a paused
//! clock. Suitable for development and single-instance deployments only.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use tokio::time::Instant;

use cg_core::context::RequestContext;
use cg_core::domain::entities::verification_code::code_key;
use cg_core::errors::CodeError;
use cg_core::repositories::CodeStore;
use cg_shared::config::CodeConfig;

#[derive(Debug, Clone)]
struct Entry {
    code: String,
    attempts_left: u32,
    /// `None` marks a key left without expiry
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Code store keeping codes in process memory
pub struct MemoryCodeStore {
    entries: Mutex<HashMap<String, Entry>>,
    config: CodeConfig,
}

impl MemoryCodeStore {
    pub fn new(config: CodeConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lifecycle settings this store enforces
    pub fn code_config(&self) -> &CodeConfig {
        &self.config
    }

    fn key(&self, scope: &str, phone: &str) -> String {
        code_key(&self.config.key_prefix, scope, phone)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, CodeError> {
        self.entries
            .lock()
            .map_err(|_| CodeError::system("memory code store lock poisoned"))
    }

    /// Remaining lifetime of the live code, `None` when absent or without expiry
    pub fn remaining_ttl(&self, scope: &str, phone: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.lock().ok()?;
        entries
            .get(&self.key(scope, phone))
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Store a code without expiry, reproducing a key left by a non-atomic writer
    pub fn insert_without_expiry(&self, scope: &str, phone: &str, code: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                self.key(scope, phone),
                Entry {
                    code: code.to_string(),
                    attempts_left: self.config.max_attempts,
                    expires_at: None,
                },
            );
        }
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn set(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        code: &str,
    ) -> Result<(), CodeError> {
        ctx.check()?;

        let now = Instant::now();
        let key = self.key(scope, phone);
        let mut entries = self.lock()?;

        // Expired codes nobody verified are dropped here
        entries.retain(|_, entry| entry.is_live(now));

        if let Some(entry) = entries.get(&key) {
            let expires_at = entry
                .expires_at
                .ok_or_else(|| CodeError::system(format!("code key '{}' has no expiry", key)))?;
            let remaining = expires_at.saturating_duration_since(now);
            if remaining > Duration::from_secs(self.config.resend_threshold_seconds()) {
                return Err(CodeError::TooManyRequests);
            }
        }

        entries.insert(
            key,
            Entry {
                code: code.to_string(),
                attempts_left: self.config.max_attempts,
                expires_at: Some(now + self.config.ttl()),
            },
        );
        Ok(())
    }

    async fn verify(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> Result<bool, CodeError> {
        ctx.check()?;

        let now = Instant::now();
        let key = self.key(scope, phone);
        let mut entries = self.lock()?;

        match entries.get(&key).map(|entry| entry.is_live(now)) {
            None => return Err(CodeError::NotFound),
            Some(false) => {
                entries.remove(&key);
                return Err(CodeError::NotFound);
            }
            Some(true) => {}
        }

        let entry = entries.get_mut(&key).ok_or(CodeError::NotFound)?;
        if entry.attempts_left == 0 {
            return Err(CodeError::TooManyAttempts);
        }

        if !constant_time_eq(entry.code.as_bytes(), input.as_bytes()) {
            entry.attempts_left -= 1;
            return Ok(false);
        }

        entries.remove(&key);
        Ok(true)
    }
}
