//! Twilio SMS provider
//!
//! Renders the message body locally from the configured templates and sends
//! it through the Twilio Messages API. Each request is bounded by the
//! provider's request timeout; a timeout is reported as `DeadlineExceeded`.
//! The provider never retries, retries belong to the routers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use twilio::{Client, OutboundMessage};

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::SmsProvider;
use cg_shared::config::ProviderConfig;
use cg_shared::utils::mask_phone_number;

use super::message::{recipients_e164, render_template};
use crate::InfrastructureError;

/// Twilio SMS provider configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
    /// Message bodies keyed by template id
    pub templates: HashMap<String, String>,
}

impl TwilioConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let config = ProviderConfig::from_env("twilio").map_err(InfrastructureError::Config)?;
        Self::try_from(&config)
    }
}

impl TryFrom<&ProviderConfig> for TwilioConfig {
    type Error = InfrastructureError;

    fn try_from(config: &ProviderConfig) -> Result<Self, Self::Error> {
        match config {
            ProviderConfig::Twilio {
                account_sid,
                auth_token,
                from_number,
                request_timeout_secs,
                templates,
            } => Ok(Self {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from_number: from_number.clone(),
                request_timeout_secs: *request_timeout_secs,
                templates: templates.clone(),
            }),
            other => Err(InfrastructureError::Config(format!(
                "expected twilio provider configuration, got '{}'",
                other.kind()
            ))),
        }
    }
}

/// Twilio SMS provider
pub struct TwilioSmsProvider {
    name: String,
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsProvider {
    /// Create a new Twilio provider
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        if !config.from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "Twilio from number must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        let client = Client::new(&config.account_sid, &config.auth_token);

        info!(
            "Twilio SMS provider initialized with from number: {}",
            mask_phone_number(&config.from_number)
        );

        Ok(Self {
            name: "twilio".to_string(),
            client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(TwilioConfig::from_env()?)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    async fn send_one(&self, ctx: &RequestContext, to: &str, body: &str) -> Result<(), SmsError> {
        debug!("Sending SMS to {} via Twilio", mask_phone_number(to));

        let request_ctx = ctx.child_with_timeout(self.request_timeout());
        let sid = request_ctx
            .run(async {
                let msg = OutboundMessage::new(&self.config.from_number, to, body);
                self.client
                    .send_message(msg)
                    .await
                    .map(|response| response.sid)
                    .map_err(|e| SmsError::provider(&self.name, e.to_string()))
            })
            .await
            .map_err(|e| {
                warn!(
                    "Failed to send SMS to {} via Twilio: {}",
                    mask_phone_number(to),
                    e
                );
                e
            })?;

        info!(
            "SMS sent successfully to {} with SID: {}",
            mask_phone_number(to),
            sid
        );
        Ok(())
    }
}

#[async_trait]
impl SmsProvider for TwilioSmsProvider {
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
        let recipients = recipients_e164(numbers)?;
        let body = render_template(&self.config.templates, template_id, args)?;

        for to in &recipients {
            self.send_one(ctx, to, &body).await?;
        }
        Ok(())
    }
}
