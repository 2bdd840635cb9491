//! Unit tests for the rate-limited provider decorator

use std::sync::Arc;
use std::time::Duration;

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::SmsProvider;
use tokio_test::assert_ok;

use super::mocks::{args, call_log, calls, numbers, Behavior, LimiterAnswer, MockLimiter, MockProvider};
use crate::services::MemoryRateLimiter;
use crate::sms::{LimiterFailurePolicy, OrderedFailover, RateLimitedProvider};

const TEMPLATE: &str = "1877556";

async fn send(provider: &dyn SmsProvider) -> Result<(), SmsError> {
    provider
        .send(&RequestContext::background(), TEMPLATE, &args(), &numbers())
        .await
}

#[tokio::test]
async fn test_allowed_send_reaches_target() {
    let log = call_log();
    let limiter = MockLimiter::new(LimiterAnswer::Allow);
    let provider = RateLimitedProvider::new(
        MockProvider::shared("tencent", Behavior::Succeed, &log),
        limiter.clone(),
        "sms:tencent",
        LimiterFailurePolicy::FailClosed,
    );

    assert_ok!(send(&provider).await);
    assert_eq!(limiter.call_count(), 1);
    assert_eq!(calls(&log), vec!["tencent"]);
    assert_eq!(provider.name(), "tencent");
}

#[tokio::test]
async fn test_denied_send_is_throttled_without_calling_target() {
    let log = call_log();
    let provider = RateLimitedProvider::new(
        MockProvider::shared("tencent", Behavior::Succeed, &log),
        MockLimiter::new(LimiterAnswer::Deny),
        "sms:tencent",
        LimiterFailurePolicy::FailOpen,
    );

    match send(&provider).await {
        Err(SmsError::Throttled { key }) => assert_eq!(key, "sms:tencent"),
        other => panic!("expected throttled, got {:?}", other),
    }
    assert!(calls(&log).is_empty());
}

#[tokio::test]
async fn test_limiter_failure_fail_closed() {
    let log = call_log();
    let provider = RateLimitedProvider::new(
        MockProvider::shared("tencent", Behavior::Succeed, &log),
        MockLimiter::new(LimiterAnswer::Fail),
        "sms:tencent",
        LimiterFailurePolicy::FailClosed,
    );

    assert!(matches!(
        send(&provider).await,
        Err(SmsError::LimiterFailure(_))
    ));
    assert!(calls(&log).is_empty());
}

#[tokio::test]
async fn test_limiter_failure_fail_open() {
    let log = call_log();
    let provider = RateLimitedProvider::new(
        MockProvider::shared("tencent", Behavior::Succeed, &log),
        MockLimiter::new(LimiterAnswer::Fail),
        "sms:tencent",
        LimiterFailurePolicy::from_fail_open(true),
    );

    assert_ok!(send(&provider).await);
    assert_eq!(calls(&log), vec!["tencent"]);
}

#[tokio::test]
async fn test_target_errors_pass_through_unchanged() {
    let log = call_log();
    let provider = RateLimitedProvider::new(
        Arc::new(OrderedFailover::new(vec![MockProvider::shared(
            "a",
            Behavior::Fail,
            &log,
        )])),
        MockLimiter::new(LimiterAnswer::Allow),
        "sms:ordered",
        LimiterFailurePolicy::FailClosed,
    );

    assert!(matches!(
        send(&provider).await,
        Err(SmsError::AllProvidersFailed { attempted: 1 })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_decorator_with_window_limiter() {
    let log = call_log();
    let provider = RateLimitedProvider::new(
        MockProvider::shared("tencent", Behavior::Succeed, &log),
        Arc::new(MemoryRateLimiter::new(Duration::from_secs(1), 2)),
        "sms:tencent",
        LimiterFailurePolicy::FailClosed,
    );

    assert_ok!(send(&provider).await);
    assert_ok!(send(&provider).await);
    assert!(matches!(send(&provider).await, Err(SmsError::Throttled { .. })));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_ok!(send(&provider).await);
    assert_eq!(calls(&log).len(), 3);
}
