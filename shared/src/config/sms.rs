//! SMS provider chain configuration module

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the configured providers are combined into one sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStrategy {
    /// Use the first provider only
    #[default]
    Single,
    /// Try providers in list order until one succeeds
    Ordered,
    /// Try providers starting from a rotating offset
    Rotating,
    /// Stick to one provider, switch after consecutive timeouts
    Timeout,
}

impl std::str::FromStr for RoutingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(RoutingStrategy::Single),
            "ordered" | "failover" => Ok(RoutingStrategy::Ordered),
            "rotating" | "round_robin" => Ok(RoutingStrategy::Rotating),
            "timeout" | "circuit" => Ok(RoutingStrategy::Timeout),
            _ => Err(format!("Invalid routing strategy: {}", s)),
        }
    }
}

/// SMS provider chain configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Routing strategy across providers
    #[serde(default)]
    pub strategy: RoutingStrategy,

    /// Consecutive timeouts before the timeout strategy switches providers
    #[serde(default = "default_timeout_threshold")]
    pub timeout_threshold: u32,

    /// Providers in priority order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            strategy: RoutingStrategy::default(),
            timeout_threshold: default_timeout_threshold(),
            providers: default_providers(),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    ///
    /// `SMS_PROVIDERS` is a comma separated list of provider kinds
    /// (`memory`, `twilio`, `aws-sns`); each vendor reads its own credentials.
    pub fn from_env() -> Result<Self, String> {
        let strategy = match std::env::var("SMS_STRATEGY") {
            Ok(value) => value.parse()?,
            Err(_) => RoutingStrategy::default(),
        };
        let timeout_threshold = std::env::var("SMS_TIMEOUT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_timeout_threshold);

        let kinds = std::env::var("SMS_PROVIDERS")
            .or_else(|_| std::env::var("SMS_PROVIDER"))
            .unwrap_or_else(|_| "memory".to_string());

        let providers = kinds
            .split(',')
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .map(ProviderConfig::from_env)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            strategy,
            timeout_threshold,
            providers,
        })
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.providers.is_empty() {
            return Err("at least one SMS provider must be configured".to_string());
        }
        if self.strategy == RoutingStrategy::Timeout && self.timeout_threshold == 0 {
            return Err("timeout threshold must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Configuration for a single SMS provider
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Development provider that logs messages instead of sending them
    Memory {
        #[serde(default = "default_memory_name")]
        name: String,
    },
    /// Twilio Programmable SMS
    Twilio {
        account_sid: String,
        auth_token: String,
        /// Sender number in E.164 format
        from_number: String,
        #[serde(default = "default_request_timeout_secs")]
        request_timeout_secs: u64,
        #[serde(default = "default_templates")]
        templates: HashMap<String, String>,
    },
    /// AWS Simple Notification Service
    AwsSns {
        access_key_id: String,
        secret_access_key: String,
        #[serde(default = "default_region")]
        region: String,
        #[serde(default)]
        sender_id: Option<String>,
        #[serde(default = "default_sms_type")]
        sms_type: String,
        #[serde(default = "default_request_timeout_secs")]
        request_timeout_secs: u64,
        #[serde(default = "default_templates")]
        templates: HashMap<String, String>,
    },
}

impl ProviderConfig {
    /// Provider kind as used in configuration
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::Memory { .. } => "memory",
            ProviderConfig::Twilio { .. } => "twilio",
            ProviderConfig::AwsSns { .. } => "aws_sns",
        }
    }

    /// Load a single provider configuration from environment variables
    pub fn from_env(kind: &str) -> Result<Self, String> {
        match kind.to_lowercase().as_str() {
            "memory" | "mock" => Ok(ProviderConfig::Memory {
                name: default_memory_name(),
            }),
            "twilio" => {
                let from_number = required_env("TWILIO_FROM_NUMBER")?;
                if !from_number.starts_with('+') {
                    return Err(
                        "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
                    );
                }
                Ok(ProviderConfig::Twilio {
                    account_sid: required_env("TWILIO_ACCOUNT_SID")?,
                    auth_token: required_env("TWILIO_AUTH_TOKEN")?,
                    from_number,
                    request_timeout_secs: std::env::var("TWILIO_REQUEST_TIMEOUT_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_else(default_request_timeout_secs),
                    templates: default_templates(),
                })
            }
            "aws-sns" | "aws_sns" => {
                let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
                    .or_else(|_| std::env::var("AWS_SNS_ACCESS_KEY_ID"))
                    .map_err(|_| {
                        "AWS_ACCESS_KEY_ID or AWS_SNS_ACCESS_KEY_ID not set".to_string()
                    })?;
                let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
                    .or_else(|_| std::env::var("AWS_SNS_SECRET_ACCESS_KEY"))
                    .map_err(|_| {
                        "AWS_SECRET_ACCESS_KEY or AWS_SNS_SECRET_ACCESS_KEY not set".to_string()
                    })?;
                let sms_type =
                    std::env::var("AWS_SNS_SMS_TYPE").unwrap_or_else(|_| default_sms_type());
                if sms_type != "Transactional" && sms_type != "Promotional" {
                    return Err(
                        "AWS_SNS_SMS_TYPE must be either 'Transactional' or 'Promotional'"
                            .to_string(),
                    );
                }
                Ok(ProviderConfig::AwsSns {
                    access_key_id,
                    secret_access_key,
                    region: std::env::var("AWS_REGION")
                        .or_else(|_| std::env::var("AWS_SNS_REGION"))
                        .unwrap_or_else(|_| default_region()),
                    sender_id: std::env::var("AWS_SNS_SENDER_ID").ok(),
                    sms_type,
                    request_timeout_secs: std::env::var("AWS_SNS_REQUEST_TIMEOUT_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_else(default_request_timeout_secs),
                    templates: default_templates(),
                })
            }
            other => Err(format!("Unknown SMS provider '{}'", other)),
        }
    }
}

fn required_env(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{} not set", name))
}

fn default_timeout_threshold() -> u32 {
    3
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::Memory {
        name: default_memory_name(),
    }]
}

fn default_memory_name() -> String {
    String::from("memory")
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_region() -> String {
    String::from("us-east-1")
}

fn default_sms_type() -> String {
    String::from("Transactional")
}

/// Built-in message bodies keyed by template id, `{1}`..`{n}` are arguments
pub fn default_templates() -> HashMap<String, String> {
    HashMap::from([(
        String::from("1877556"),
        String::from("Your verification code is {1}. It expires in 10 minutes."),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("ordered".parse::<RoutingStrategy>().unwrap(), RoutingStrategy::Ordered);
        assert_eq!("Rotating".parse::<RoutingStrategy>().unwrap(), RoutingStrategy::Rotating);
        assert_eq!("circuit".parse::<RoutingStrategy>().unwrap(), RoutingStrategy::Timeout);
        assert!("random".parse::<RoutingStrategy>().is_err());
    }

    #[test]
    fn test_default_config_uses_memory_provider() {
        let config = SmsConfig::default();
        assert_eq!(config.strategy, RoutingStrategy::Single);
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].kind(), "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_providers() {
        let config = SmsConfig {
            providers: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_provider_kind() {
        let err = ProviderConfig::from_env("carrier-pigeon").unwrap_err();
        assert!(err.contains("Unknown SMS provider"));
    }
}
