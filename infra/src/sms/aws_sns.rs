//! AWS SNS SMS provider
//!
//! Publishes the locally rendered message body directly to each phone
//! number. Requests are bounded by the provider's request timeout and never
//! retried here.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::{
    config::Region, error::DisplayErrorContext, types::MessageAttributeValue, Client as SnsClient,
};
use tracing::{debug, info, warn};

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::SmsProvider;
use cg_shared::config::ProviderConfig;
use cg_shared::utils::mask_phone_number;

use super::message::{recipients_e164, render_template};
use crate::InfrastructureError;

/// AWS SNS SMS provider configuration
#[derive(Debug, Clone)]
pub struct AwsSnsConfig {
    /// AWS Access Key ID
    pub access_key_id: String,
    /// AWS Secret Access Key
    pub secret_access_key: String,
    /// AWS Region (e.g., "us-east-1")
    pub region: String,
    /// SMS sender ID (optional, may not be supported in all regions)
    pub sender_id: Option<String>,
    /// SMS type: "Transactional" or "Promotional"
    pub sms_type: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
    /// Message bodies keyed by template id
    pub templates: HashMap<String, String>,
}

impl AwsSnsConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let config = ProviderConfig::from_env("aws_sns").map_err(InfrastructureError::Config)?;
        Self::try_from(&config)
    }
}

impl TryFrom<&ProviderConfig> for AwsSnsConfig {
    type Error = InfrastructureError;

    fn try_from(config: &ProviderConfig) -> Result<Self, Self::Error> {
        match config {
            ProviderConfig::AwsSns {
                access_key_id,
                secret_access_key,
                region,
                sender_id,
                sms_type,
                request_timeout_secs,
                templates,
            } => Ok(Self {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                region: region.clone(),
                sender_id: sender_id.clone(),
                sms_type: sms_type.clone(),
                request_timeout_secs: *request_timeout_secs,
                templates: templates.clone(),
            }),
            other => Err(InfrastructureError::Config(format!(
                "expected aws_sns provider configuration, got '{}'",
                other.kind()
            ))),
        }
    }
}

/// Build the SMS message attributes sent with every publish
fn sms_attributes(
    config: &AwsSnsConfig,
) -> Result<HashMap<String, MessageAttributeValue>, InfrastructureError> {
    let string_attribute = |value: &str| {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|e| InfrastructureError::Sms(format!("Invalid SNS attribute: {}", e)))
    };

    let mut attributes = HashMap::new();
    attributes.insert(
        "AWS.SNS.SMS.SMSType".to_string(),
        string_attribute(&config.sms_type)?,
    );
    if let Some(sender_id) = &config.sender_id {
        attributes.insert(
            "AWS.SNS.SMS.SenderID".to_string(),
            string_attribute(sender_id)?,
        );
    }
    Ok(attributes)
}

/// AWS SNS SMS provider
pub struct AwsSnsSmsProvider {
    name: String,
    client: SnsClient,
    config: AwsSnsConfig,
    attributes: HashMap<String, MessageAttributeValue>,
}

impl AwsSnsSmsProvider {
    /// Create a new AWS SNS provider
    pub async fn new(config: AwsSnsConfig) -> Result<Self, InfrastructureError> {
        if config.sms_type != "Transactional" && config.sms_type != "Promotional" {
            return Err(InfrastructureError::Config(
                "SNS sms_type must be either 'Transactional' or 'Promotional'".to_string(),
            ));
        }
        let attributes = sms_attributes(&config)?;

        let credentials_provider = aws_credential_types::Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "codegate_sns_provider",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials_provider)
            .load()
            .await;

        let client = SnsClient::new(&aws_config);

        info!("AWS SNS SMS provider initialized for region: {}", config.region);

        Ok(Self {
            name: "aws_sns".to_string(),
            client,
            config,
            attributes,
        })
    }

    /// Create from environment variables
    pub async fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(AwsSnsConfig::from_env()?).await
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    async fn publish(&self, ctx: &RequestContext, to: &str, body: &str) -> Result<(), SmsError> {
        debug!("Sending SMS to {} via AWS SNS", mask_phone_number(to));

        let request_ctx = ctx.child_with_timeout(self.request_timeout());
        let message_id = request_ctx
            .run(async {
                self.client
                    .publish()
                    .phone_number(to)
                    .message(body)
                    .set_message_attributes(Some(self.attributes.clone()))
                    .send()
                    .await
                    .map(|response| response.message_id().unwrap_or("unknown").to_string())
                    .map_err(|e| SmsError::provider(&self.name, DisplayErrorContext(&e).to_string()))
            })
            .await
            .map_err(|e| {
                warn!(
                    "Failed to send SMS to {} via AWS SNS: {}",
                    mask_phone_number(to),
                    e
                );
                e
            })?;

        info!(
            "SMS sent successfully to {} via AWS SNS with message ID: {}",
            mask_phone_number(to),
            message_id
        );
        Ok(())
    }
}

#[async_trait]
impl SmsProvider for AwsSnsSmsProvider {
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
            self.publish(ctx, to, &body).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_shared::config::sms::default_templates;

    fn config() -> AwsSnsConfig {
        AwsSnsConfig {
            access_key_id: "AKIA_TEST".to_string(),
            secret_access_key: "secret".to_string(),
            region: "us-west-2".to_string(),
            sender_id: Some("CodeGate".to_string()),
            sms_type: "Transactional".to_string(),
            request_timeout_secs: 5,
            templates: default_templates(),
        }
    }

    #[test]
    fn test_sms_attributes() {
        let attributes = sms_attributes(&config()).unwrap();
        assert_eq!(
            attributes["AWS.SNS.SMS.SMSType"].string_value(),
            Some("Transactional")
        );
        assert_eq!(
            attributes["AWS.SNS.SMS.SenderID"].string_value(),
            Some("CodeGate")
        );
    }

    #[tokio::test]
    async fn test_rejects_unknown_sms_type() {
        let mut config = config();
        config.sms_type = "Bulk".to_string();
        assert!(matches!(
            AwsSnsSmsProvider::new(config).await,
            Err(InfrastructureError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_network() {
        let provider = AwsSnsSmsProvider::new(config()).await.unwrap();
        let result = provider
            .send(
                &RequestContext::background(),
                "missing",
                &[],
                &["+14155552671".to_string()],
            )
            .await;
        assert!(matches!(result, Err(SmsError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_whole_send() {
        let provider = AwsSnsSmsProvider::new(config()).await.unwrap();
        let result = provider
            .send(
                &RequestContext::background(),
                "1877556",
                &["123456".to_string()],
                &["15212345678".to_string(), "12345".to_string()],
            )
            .await;
        assert!(matches!(result, Err(SmsError::InvalidRequest { .. })));
    }
}
