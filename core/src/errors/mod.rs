//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{BoxError, CodeError, LimitError, SmsError};

use thiserror::Error;

/// Errors surfaced by the code service to the consuming layer
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error(transparent)]
    Sms(#[from] SmsError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the user can act on the error (wait, request a new code)
    /// rather than seeing a generic failure message
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            DomainError::Code(
                CodeError::TooManyRequests | CodeError::TooManyAttempts | CodeError::NotFound
            ) | DomainError::Sms(SmsError::Throttled { .. })
        )
    }

    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Code(err) => match err {
                CodeError::TooManyRequests => "CODE_SEND_TOO_FREQUENT",
                CodeError::TooManyAttempts => "CODE_VERIFY_TOO_MANY_ATTEMPTS",
                CodeError::NotFound => "CODE_NOT_FOUND",
                CodeError::Interrupted(_) => "REQUEST_INTERRUPTED",
                CodeError::System { .. } => "SYSTEM_ERROR",
            },
            DomainError::Sms(err) => match err {
                SmsError::Throttled { .. } => "SMS_THROTTLED",
                SmsError::Cancelled | SmsError::DeadlineExceeded => "REQUEST_INTERRUPTED",
                _ => "SYSTEM_ERROR",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Interrupted;
    use std::error::Error as _;

    #[test]
    fn test_recoverable_errors_are_distinguishable_from_system_errors() {
        assert!(DomainError::from(CodeError::TooManyRequests).is_user_recoverable());
        assert!(DomainError::from(CodeError::TooManyAttempts).is_user_recoverable());
        assert!(DomainError::from(SmsError::Throttled { key: "sms:tencent".into() })
            .is_user_recoverable());

        let system = DomainError::from(CodeError::system("script returned -2"));
        assert!(!system.is_user_recoverable());
        assert_eq!(system.error_code(), "SYSTEM_ERROR");

        let exhausted = DomainError::from(SmsError::AllProvidersFailed { attempted: 2 });
        assert!(!exhausted.is_user_recoverable());
        assert_eq!(exhausted.error_code(), "SYSTEM_ERROR");
    }

    #[test]
    fn test_system_error_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        let err = CodeError::system_with("failed to run set script", cause);
        assert!(err.source().unwrap().to_string().contains("connection reset"));
    }

    #[test]
    fn test_interrupted_maps_to_sms_kinds() {
        assert!(matches!(SmsError::from(Interrupted::Cancelled), SmsError::Cancelled));
        let timeout = SmsError::from(Interrupted::DeadlineExceeded);
        assert!(timeout.is_timeout());
        assert!(timeout.is_terminal());
        assert!(!SmsError::provider("twilio", "503").is_terminal());
    }

    #[test]
    fn test_limiter_failure_is_distinct_from_throttled() {
        let err = SmsError::LimiterFailure(LimitError::store(
            "script failed",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        ));
        assert!(!DomainError::from(err).is_user_recoverable());
    }
}
