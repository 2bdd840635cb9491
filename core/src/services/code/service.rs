//! Main code service implementation

use std::sync::Arc;

use cg_shared::config::CodeConfig;
use cg_shared::utils::mask_phone_number;

use crate::context::RequestContext;
use crate::domain::entities::verification_code::VerificationCode;
use crate::errors::{CodeError, DomainResult};
use crate::repositories::CodeStore;
use crate::services::sms::SmsProvider;

use super::config::CodeServiceConfig;
use super::types::SendCodeResult;

/// Issues, delivers and verifies one-time codes
pub struct CodeService<C: CodeStore + ?Sized, P: SmsProvider + ?Sized> {
    /// Atomic code store
    store: Arc<C>,
    /// Provider chain used for delivery
    provider: Arc<P>,
    config: CodeServiceConfig,
}

impl<C: CodeStore + ?Sized, P: SmsProvider + ?Sized> CodeService<C, P> {
    /// Create a new code service
    ///
    /// # Arguments
    ///
    /// * `store` - Code store implementation
    /// * `provider` - Provider or provider chain delivering the codes
    /// * `config` - Service configuration
    ///
    /// `config.ttl` and `config.resend_cooldown` only feed `SendCodeResult`;
    /// the store enforces its own values. Build both from the same
    /// `CodeConfig`, or use [`CodeService::from_code_config`].
    pub fn new(store: Arc<C>, provider: Arc<P>, config: CodeServiceConfig) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Create a service whose reported expiry and cooldown come from the
    /// same `CodeConfig` the store was built with
    pub fn from_code_config(store: Arc<C>, provider: Arc<P>, config: &CodeConfig) -> Self {
        Self::new(store, provider, CodeServiceConfig::from(config))
    }

    /// Generate a code for `(scope, phone)`, store it and deliver it.
    ///
    /// Store errors (`TooManyRequests`, `System`, interruption) are returned
    /// as-is and nothing is sent. Provider chain errors are returned as-is
    /// once the code is stored.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
    ) -> DomainResult<SendCodeResult> {
        let masked = mask_phone_number(phone);
        let code = VerificationCode::issue(scope, phone, self.config.ttl);

        if let Err(e) = self.store.set(ctx, scope, phone, &code.value).await {
            match &e {
                CodeError::TooManyRequests => tracing::warn!(
                    scope = scope,
                    phone = %masked,
                    event = "code_send_too_frequent",
                    "Verification code requested inside resend cooldown"
                ),
                _ => tracing::error!(
                    scope = scope,
                    phone = %masked,
                    error = %e,
                    event = "code_store_failed",
                    "Failed to store verification code"
                ),
            }
            return Err(e.into());
        }

        self.provider
            .send(
                ctx,
                &self.config.template_id,
                std::slice::from_ref(&code.value),
                &[phone.to_string()],
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    scope = scope,
                    phone = %masked,
                    provider = self.provider.name(),
                    error = %e,
                    event = "code_delivery_failed",
                    "Failed to deliver verification code"
                );
                e
            })?;

        tracing::info!(
            scope = scope,
            phone = %masked,
            event = "code_sent",
            "Verification code issued and delivered"
        );

        let next_resend_at = code.created_at
            + chrono::Duration::from_std(self.config.resend_cooldown)
                .unwrap_or_else(|_| chrono::Duration::zero());

        Ok(SendCodeResult {
            scope: code.scope.clone(),
            expires_at: code.expires_at(),
            next_resend_at,
        })
    }

    /// Check `input` against the live code for `(scope, phone)`
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The code matched and has been consumed
    /// * `Ok(false)` - The code did not match; one attempt was used
    /// * `Err(DomainError)` - `TooManyAttempts`, `NotFound` or a system failure
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> DomainResult<bool> {
        let matched = self.store.verify(ctx, scope, phone, input).await.map_err(|e| {
            tracing::warn!(
                scope = scope,
                phone = %mask_phone_number(phone),
                error = %e,
                event = "code_verify_rejected",
                "Verification code check failed"
            );
            e
        })?;

        if matched {
            tracing::info!(
                scope = scope,
                phone = %mask_phone_number(phone),
                event = "code_verified",
                "Verification code matched"
            );
        } else {
            tracing::debug!(
                scope = scope,
                phone = %mask_phone_number(phone),
                event = "code_mismatch",
                "Verification code mismatch"
            );
        }

        Ok(matched)
    }
}
