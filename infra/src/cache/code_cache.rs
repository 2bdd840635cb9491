//! Redis-backed code store
//!
//! Both operations run as a single server-side Lua script, so concurrent
//! callers for the same (scope, phone) serialize inside Redis. The code and
//! its attempt counter live under sibling keys with the same expiry.

use async_trait::async_trait;
use redis::Script;
use tracing::{debug, warn};

use cg_core::context::RequestContext;
use cg_core::domain::entities::verification_code::{attempts_key, code_key};
use cg_core::errors::CodeError;
use cg_core::repositories::CodeStore;
use cg_shared::config::CodeConfig;
use cg_shared::utils::mask_phone_number;

use super::redis_client::RedisClient;

const SET_CODE_SCRIPT: &str = include_str!("lua/set_code.lua");
const VERIFY_CODE_SCRIPT: &str = include_str!("lua/verify_code.lua");

/// Code store backed by Redis Lua scripts
pub struct RedisCodeStore {
    client: RedisClient,
    config: CodeConfig,
    set_script: Script,
    verify_script: Script,
}

impl RedisCodeStore {
    /// Create a new store
    ///
    /// # Arguments
    /// * `client` - Connected Redis client
    /// * `config` - TTL, cooldown and attempt budget of issued codes
    pub fn new(client: RedisClient, config: CodeConfig) -> Self {
        Self {
            client,
            config,
            set_script: Script::new(SET_CODE_SCRIPT),
            verify_script: Script::new(VERIFY_CODE_SCRIPT),
        }
    }

    /// Lifecycle settings this store enforces
    pub fn code_config(&self) -> &CodeConfig {
        &self.config
    }

    /// Keys of the code and of its attempt counter
    fn keys(&self, scope: &str, phone: &str) -> (String, String) {
        let key = self
            .client
            .key(&code_key(&self.config.key_prefix, scope, phone));
        let counter = attempts_key(&key);
        (key, counter)
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn set(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        code: &str,
    ) -> Result<(), CodeError> {
        let (key, counter) = self.keys(scope, phone);
        let mut invocation = self.set_script.prepare_invoke();
        invocation
            .key(&key)
            .key(&counter)
            .arg(code)
            .arg(self.config.ttl_seconds)
            .arg(self.config.resend_threshold_seconds())
            .arg(self.config.max_attempts);

        let result: i64 = self
            .client
            .invoke(ctx, &invocation, |e| {
                CodeError::system_with("failed to run set code script", e)
            })
            .await?;

        match result {
            0 => {
                debug!(scope = scope, phone = %mask_phone_number(phone), "Stored verification code");
                Ok(())
            }
            -1 => Err(CodeError::TooManyRequests),
            -2 => {
                warn!(
                    scope = scope,
                    phone = %mask_phone_number(phone),
                    "Verification code key exists without expiry"
                );
                Err(CodeError::system(format!("code key '{}' has no expiry", key)))
            }
            other => Err(CodeError::system(format!(
                "unexpected set code script result {}",
                other
            ))),
        }
    }

    async fn verify(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> Result<bool, CodeError> {
        let (key, counter) = self.keys(scope, phone);
        let mut invocation = self.verify_script.prepare_invoke();
        invocation.key(&key).key(&counter).arg(input);

        let result: i64 = self
            .client
            .invoke(ctx, &invocation, |e| {
                CodeError::system_with("failed to run verify code script", e)
            })
            .await?;

        match result {
            0 => Ok(true),
            -1 => Err(CodeError::TooManyAttempts),
            -2 => Ok(false),
            -3 => Err(CodeError::NotFound),
            other => Err(CodeError::system(format!(
                "unexpected verify code script result {}",
                other
            ))),
        }
    }
}
