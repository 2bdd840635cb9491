//! Memory SMS provider
//!
//! Logs messages instead of sending them and keeps every delivery for
//! inspection. Used in development and tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::SmsProvider;
use cg_shared::utils::{is_valid_phone, mask_phone_number, mask_phone_numbers};

use super::message::require_recipients;

/// A message accepted by the memory provider
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Mock message id
    pub id: String,
    pub template_id: String,
    pub args: Vec<String>,
    pub numbers: Vec<String>,
    pub sent_at: DateTime<Utc>,
}

/// SMS provider that records messages in memory
pub struct MemorySmsProvider {
    name: String,
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemorySmsProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// Every delivery so far, oldest first
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .map(|deliveries| deliveries.clone())
            .unwrap_or_default()
    }

    /// Number of deliveries so far
    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// First template argument of the latest message sent to `phone`
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        let deliveries = self.deliveries.lock().ok()?;
        deliveries
            .iter()
            .rev()
            .find(|d| d.numbers.iter().any(|n| n == phone))
            .and_then(|d| d.args.first().cloned())
    }
}

impl Default for MemorySmsProvider {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl SmsProvider for MemorySmsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[String],
        numbers: &[String],
    ) -> Result<(), SmsError> {
        ctx.check()?;
        require_recipients(numbers)?;

        if let Some(invalid) = numbers.iter().find(|n| !is_valid_phone(n)) {
            return Err(SmsError::invalid_request(format!(
                "invalid phone number: {}",
                mask_phone_number(invalid)
            )));
        }

        let delivery = Delivery {
            id: format!("mem-{}", Uuid::new_v4()),
            template_id: template_id.to_string(),
            args: args.to_vec(),
            numbers: numbers.to_vec(),
            sent_at: Utc::now(),
        };

        info!(
            provider = %self.name,
            message_id = %delivery.id,
            template_id = template_id,
            phones = %mask_phone_numbers(numbers),
            "Memory SMS provider accepted message"
        );
        // Template arguments carry the code
        debug!(
            provider = %self.name,
            message_id = %delivery.id,
            args = ?args,
            "Memory SMS message arguments"
        );

        self.deliveries
            .lock()
            .map_err(|_| SmsError::provider(&self.name, "delivery log lock poisoned"))?
            .push(delivery);
        Ok(())
    }
}
