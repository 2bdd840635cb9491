//! Mock providers and limiters for SMS routing tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cg_core::context::RequestContext;
use cg_core::errors::{LimitError, SmsError};
use cg_core::services::{RateLimiter, SharedSmsProvider, SmsProvider};

/// Shared record of which provider was called, in call order
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// What a mock provider does on every send
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    Timeout,
    Cancel,
}

pub struct MockProvider {
    name: String,
    behavior: Behavior,
    log: CallLog,
}

impl MockProvider {
    pub fn shared(name: &str, behavior: Behavior, log: &CallLog) -> SharedSmsProvider {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            log: log.clone(),
        })
    }
}

#[async_trait]
impl SmsProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        _ctx: &RequestContext,
        _template_id: &str,
        _args: &[String],
        _numbers: &[String],
    ) -> Result<(), SmsError> {
        self.log.lock().unwrap().push(self.name.clone());
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(SmsError::provider(&self.name, "503 Service Unavailable")),
            Behavior::Timeout => Err(SmsError::DeadlineExceeded),
            Behavior::Cancel => Err(SmsError::Cancelled),
        }
    }
}

/// What a mock limiter answers
#[derive(Debug, Clone, Copy)]
pub enum LimiterAnswer {
    Allow,
    Deny,
    Fail,
}

pub struct MockLimiter {
    answer: LimiterAnswer,
    pub calls: AtomicUsize,
}

impl MockLimiter {
    pub fn new(answer: LimiterAnswer) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateLimiter for MockLimiter {
    async fn limit(&self, _ctx: &RequestContext, _key: &str) -> Result<bool, LimitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            LimiterAnswer::Allow => Ok(true),
            LimiterAnswer::Deny => Ok(false),
            LimiterAnswer::Fail => Err(LimitError::Store {
                message: "connection refused".to_string(),
                source: None,
            }),
        }
    }
}

pub fn args() -> Vec<String> {
    vec!["123456".to_string()]
}

pub fn numbers() -> Vec<String> {
    vec!["15212345678".to_string()]
}
