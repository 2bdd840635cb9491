//! Component error types for the code store, the rate limiter and the
//! provider chain.

use thiserror::Error;

use crate::context::Interrupted;

/// Boxed underlying cause kept for diagnostics
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a code store
#[derive(Error, Debug)]
pub enum CodeError {
    /// A code for this scope and phone is still inside its resend cooldown
    #[error("Verification code requested too frequently")]
    TooManyRequests,

    /// The attempt budget of the live code is spent
    #[error("Verification attempts exhausted")]
    TooManyAttempts,

    /// No live code exists (never issued, expired, or already consumed)
    #[error("Verification code not found")]
    NotFound,

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error("Code store failure: {message}")]
    System {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl CodeError {
    pub fn system(message: impl Into<String>) -> Self {
        CodeError::System {
            message: message.into(),
            source: None,
        }
    }

    pub fn system_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CodeError::System {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Errors raised by a rate limiter
#[derive(Error, Debug)]
pub enum LimitError {
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error("Rate limiter store failure: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl LimitError {
    pub fn store(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LimitError::Store {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Errors raised while sending through a provider or a provider chain
#[derive(Error, Debug)]
pub enum SmsError {
    /// The rate limiter denied the send
    #[error("SMS sending throttled for '{key}'")]
    Throttled { key: String },

    /// The rate limiter could not decide
    #[error("SMS rate limiter failure: {0}")]
    LimiterFailure(#[source] LimitError),

    /// Every provider in the chain failed
    #[error("All {attempted} SMS providers failed")]
    AllProvidersFailed { attempted: usize },

    #[error("SMS send cancelled")]
    Cancelled,

    #[error("SMS send deadline exceeded")]
    DeadlineExceeded,

    /// A vendor rejected or failed the request
    #[error("SMS provider '{provider}' failed: {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The request cannot be sent by this provider (bad template, recipients)
    #[error("Invalid SMS request: {message}")]
    InvalidRequest { message: String },

    /// The chain or a provider was configured inconsistently
    #[error("SMS configuration error: {message}")]
    Config { message: String },
}

impl SmsError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SmsError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn provider_with(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        SmsError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        SmsError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Deadline exceeded, the only kind counted by the timeout router
    pub fn is_timeout(&self) -> bool {
        matches!(self, SmsError::DeadlineExceeded)
    }

    /// Caller-driven stop; retrying another provider is pointless
    pub fn is_terminal(&self) -> bool {
        matches!(self, SmsError::Cancelled | SmsError::DeadlineExceeded)
    }
}

impl From<Interrupted> for SmsError {
    fn from(err: Interrupted) -> Self {
        match err {
            Interrupted::Cancelled => SmsError::Cancelled,
            Interrupted::DeadlineExceeded => SmsError::DeadlineExceeded,
        }
    }
}
