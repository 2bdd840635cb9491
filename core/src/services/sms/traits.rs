//! Provider capability implemented by vendor clients, routers and decorators

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::errors::SmsError;

/// Sends a templated message to one or more phone numbers
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Name used in logs and rate-limit keys
    fn name(&self) -> &str;

    /// Send `template_id` rendered with the ordered `args` to every number in `numbers`
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[String],
        numbers: &[String],
    ) -> Result<(), SmsError>;
}

/// Shared handle to a provider, the unit routers compose
pub type SharedSmsProvider = Arc<dyn SmsProvider>;
