//! Unit tests for the ordered, rotating and timeout routers

use std::sync::Arc;

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::SmsProvider;

use super::mocks::{args, call_log, calls, numbers, Behavior, MockProvider};
use crate::sms::failover::{OrderedFailover, RotatingFailover, TimeoutFailover};

const TEMPLATE: &str = "1877556";

async fn send(provider: &dyn SmsProvider) -> Result<(), SmsError> {
    provider
        .send(&RequestContext::background(), TEMPLATE, &args(), &numbers())
        .await
}

#[tokio::test]
async fn test_ordered_tries_in_list_order() {
    let log = call_log();
    let router = OrderedFailover::new(vec![
        MockProvider::shared("a", Behavior::Fail, &log),
        MockProvider::shared("b", Behavior::Fail, &log),
        MockProvider::shared("c", Behavior::Succeed, &log),
    ]);

    assert!(send(&router).await.is_ok());
    assert_eq!(calls(&log), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_ordered_all_failed() {
    let log = call_log();
    let router = OrderedFailover::new(vec![
        MockProvider::shared("a", Behavior::Fail, &log),
        MockProvider::shared("b", Behavior::Fail, &log),
    ]);

    let result = send(&router).await;
    assert!(matches!(
        result,
        Err(SmsError::AllProvidersFailed { attempted: 2 })
    ));
    assert_eq!(calls(&log), vec!["a", "b"]);
}

#[tokio::test]
async fn test_ordered_restarts_from_first_provider() {
    let log = call_log();
    let router = OrderedFailover::new(vec![
        MockProvider::shared("a", Behavior::Fail, &log),
        MockProvider::shared("b", Behavior::Succeed, &log),
    ]);

    send(&router).await.unwrap();
    send(&router).await.unwrap();
    assert_eq!(calls(&log), vec!["a", "b", "a", "b"]);
}

#[tokio::test]
async fn test_empty_routers_report_no_attempts() {
    assert!(matches!(
        send(&OrderedFailover::new(Vec::new())).await,
        Err(SmsError::AllProvidersFailed { attempted: 0 })
    ));
    assert!(matches!(
        send(&RotatingFailover::new(Vec::new())).await,
        Err(SmsError::AllProvidersFailed { attempted: 0 })
    ));
    assert!(matches!(
        send(&TimeoutFailover::new(Vec::new(), 3)).await,
        Err(SmsError::AllProvidersFailed { attempted: 0 })
    ));
}

#[tokio::test]
async fn test_rotating_starts_from_shifting_offset() {
    let log = call_log();
    let router = RotatingFailover::new(vec![
        MockProvider::shared("a", Behavior::Fail, &log),
        MockProvider::shared("b", Behavior::Succeed, &log),
    ]);

    send(&router).await.unwrap();
    assert_eq!(calls(&log), vec!["a", "b"]);

    send(&router).await.unwrap();
    assert_eq!(calls(&log), vec!["a", "b", "b"]);
}

#[tokio::test]
async fn test_rotating_stops_on_cancellation() {
    let log = call_log();
    let router = RotatingFailover::new(vec![
        MockProvider::shared("a", Behavior::Cancel, &log),
        MockProvider::shared("b", Behavior::Succeed, &log),
    ]);

    assert!(matches!(send(&router).await, Err(SmsError::Cancelled)));
    assert_eq!(calls(&log), vec!["a"]);
}

#[tokio::test]
async fn test_rotating_stops_on_deadline() {
    let log = call_log();
    let router = RotatingFailover::new(vec![
        MockProvider::shared("a", Behavior::Timeout, &log),
        MockProvider::shared("b", Behavior::Succeed, &log),
    ]);

    assert!(matches!(send(&router).await, Err(SmsError::DeadlineExceeded)));
    assert_eq!(calls(&log), vec!["a"]);
}

#[tokio::test]
async fn test_rotating_all_failed() {
    let log = call_log();
    let router = RotatingFailover::new(vec![
        MockProvider::shared("a", Behavior::Fail, &log),
        MockProvider::shared("b", Behavior::Fail, &log),
        MockProvider::shared("c", Behavior::Fail, &log),
    ]);

    assert!(matches!(
        send(&router).await,
        Err(SmsError::AllProvidersFailed { attempted: 3 })
    ));
    assert_eq!(calls(&log).len(), 3);
}

fn timeout_router(second: Behavior, threshold: u32) -> (TimeoutFailover, super::mocks::CallLog) {
    let log = call_log();
    let router = TimeoutFailover::new(
        vec![
            MockProvider::shared("a", Behavior::Timeout, &log),
            MockProvider::shared("b", second, &log),
        ],
        threshold,
    );
    (router, log)
}

fn state_of(router: &TimeoutFailover) -> (usize, u32) {
    let state = router.state();
    (state.active_index, state.consecutive_timeouts)
}

#[tokio::test]
async fn test_timeout_switch_then_success() {
    let (router, log) = timeout_router(Behavior::Succeed, 3);
    router.set_state(0, 3);

    assert!(send(&router).await.is_ok());
    assert_eq!(state_of(&router), (1, 0));
    assert_eq!(calls(&log), vec!["b"]);
}

#[tokio::test]
async fn test_timeout_switch_then_other_error() {
    let (router, log) = timeout_router(Behavior::Fail, 3);
    router.set_state(0, 3);

    assert!(matches!(send(&router).await, Err(SmsError::Provider { .. })));
    assert_eq!(state_of(&router), (1, 0));
    assert_eq!(calls(&log), vec!["b"]);
}

#[tokio::test]
async fn test_timeout_switch_then_timeout() {
    let (router, log) = timeout_router(Behavior::Timeout, 3);
    router.set_state(0, 3);

    assert!(matches!(send(&router).await, Err(SmsError::DeadlineExceeded)));
    assert_eq!(state_of(&router), (1, 1));
    assert_eq!(calls(&log), vec!["b"]);
}

#[tokio::test]
async fn test_timeout_counts_only_deadline_errors() {
    let log = call_log();
    let router = TimeoutFailover::new(
        vec![
            MockProvider::shared("a", Behavior::Fail, &log),
            MockProvider::shared("b", Behavior::Succeed, &log),
        ],
        2,
    );

    for _ in 0..5 {
        assert!(send(&router).await.is_err());
    }
    assert_eq!(state_of(&router), (0, 0));
    assert_eq!(calls(&log), vec!["a"; 5]);
}

#[tokio::test]
async fn test_timeout_streak_switches_after_threshold() {
    let (router, log) = timeout_router(Behavior::Succeed, 2);

    assert!(send(&router).await.is_err());
    assert!(send(&router).await.is_err());
    assert_eq!(state_of(&router), (0, 2));

    assert!(send(&router).await.is_ok());
    assert_eq!(state_of(&router), (1, 0));
    assert_eq!(calls(&log), vec!["a", "a", "b"]);
}

#[tokio::test]
async fn test_timeout_success_resets_streak() {
    let log = call_log();
    let router = TimeoutFailover::new(
        vec![
            MockProvider::shared("a", Behavior::Succeed, &log),
            MockProvider::shared("b", Behavior::Succeed, &log),
        ],
        3,
    );
    router.set_state(0, 2);

    send(&router).await.unwrap();
    assert_eq!(state_of(&router), (0, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timeout_concurrent_callers_switch_once() {
    let log = call_log();
    let router = Arc::new(TimeoutFailover::new(
        vec![
            MockProvider::shared("a", Behavior::Timeout, &log),
            MockProvider::shared("b", Behavior::Succeed, &log),
            MockProvider::shared("c", Behavior::Succeed, &log),
        ],
        3,
    ));
    router.set_state(0, 3);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let router = router.clone();
        handles.push(tokio::spawn(async move { send(router.as_ref()).await }));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    assert_eq!(router.state().active_index, 1);
    assert!(calls(&log).iter().all(|name| name != "c"));
}
