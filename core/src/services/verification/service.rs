//! Main verification service implementation

use std::sync::Arc;
use std::time::Duration;
use tracing;

use dm_shared::phone::{mask_phone_number, to_e164};

use crate::errors::{DomainError, DomainResult};

use super::clock::{Clock, SystemClock};
use super::code_generator::{CodeGenerator, RandomCodeGenerator};
use super::config::VerificationServiceConfig;
use super::store::{VerificationStore, VerifyOutcome};
use super::sweeper::{ExpirySweeper, SweeperHandle};
use super::traits::SmsServiceTrait;
use super::types::{SentPhone, Verified};

/// Verification service for issuing and checking SMS one-time codes
pub struct VerificationService<S: SmsServiceTrait> {
    /// SMS service for delivering codes
    sms_service: Arc<S>,
    /// Store owning every verification record
    store: Arc<VerificationStore>,
    /// Source of new codes
    generator: Arc<dyn CodeGenerator>,
    /// Time source shared with the store and sweeper
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<S: SmsServiceTrait> VerificationService<S> {
    /// Create a new verification service using the wall clock and OS randomness
    ///
    /// # Arguments
    ///
    /// * `sms_service` - SMS service implementation
    /// * `config` - Service configuration
    pub fn new(sms_service: Arc<S>, config: VerificationServiceConfig) -> Self {
        Self::with_components(
            sms_service,
            config,
            Arc::new(RandomCodeGenerator),
            Arc::new(SystemClock),
        )
    }

    /// Create a service with an explicit code generator and clock
    pub fn with_components(
        sms_service: Arc<S>,
        config: VerificationServiceConfig,
        generator: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(VerificationStore::new(
            config.store_shards,
            config.grace_window,
            clock.clone(),
        ));

        Self {
            sms_service,
            store,
            generator,
            clock,
            config,
        }
    }

    /// Issue a new code for `raw_phone` and deliver it by SMS.
    ///
    /// Uses the configured send timeout.
    pub async fn request_code(&self, raw_phone: &str) -> DomainResult<SentPhone> {
        self.request_code_with_timeout(raw_phone, self.config.send_timeout)
            .await
    }

    /// Issue a new code for `raw_phone` and deliver it within `timeout`.
    ///
    /// This method:
    /// 1. Normalizes the phone number to E.164
    /// 2. Generates a new code
    /// 3. Stores it, superseding any earlier code for the phone
    /// 4. Sends it via SMS with no store lock held
    /// 5. Rolls the stored code back if the send fails or times out
    ///
    /// # Returns
    ///
    /// * `Ok(SentPhone)` - The normalized phone and provider message ID
    /// * `Err(DomainError::InvalidPhone)` - The number could not be normalized
    /// * `Err(DomainError::SendFailed)` - The provider failed or timed out
    pub async fn request_code_with_timeout(
        &self,
        raw_phone: &str,
        timeout: Duration,
    ) -> DomainResult<SentPhone> {
        let phone = self.normalize_phone(raw_phone)?;
        let masked = mask_phone_number(&phone);

        let code = self.generator.generate();

        // The code must be verifiable before the SMS can possibly arrive
        let expires_at = self.store.put(&phone, &code, self.config.code_ttl)?;

        tracing::info!(
            phone = %masked,
            event = "otp_generated",
            expires_at = %expires_at,
            "Generated new verification code for phone number"
        );

        let body = self.render_message(&code);
        let failure = match tokio::time::timeout(timeout, self.sms_service.send_sms(&phone, &body))
            .await
        {
            Ok(Ok(message_id)) => {
                tracing::info!(
                    phone = %masked,
                    message_id = %message_id,
                    event = "otp_sent",
                    "Verification code delivered to SMS provider"
                );
                return Ok(SentPhone {
                    phone,
                    message_id,
                    expires_at,
                });
            }
            Ok(Err(e)) => e,
            Err(_) => format!("SMS send timed out after {}ms", timeout.as_millis()),
        };

        let rolled_back = self.store.remove_if_code(&phone, &code)?;
        tracing::error!(
            phone = %masked,
            error = %failure,
            rolled_back,
            event = "otp_send_failed",
            "Failed to send verification code"
        );

        Err(DomainError::SendFailed { reason: failure })
    }

    /// Check a submitted code for `raw_phone`.
    ///
    /// Wrong, stale and unknown codes come back as typed rejections
    /// (`Mismatch`, `Expired`, `NotFound`); only store corruption is
    /// reported as `Internal`.
    pub fn verify_code(&self, raw_phone: &str, code: &str) -> DomainResult<Verified> {
        let phone = self.normalize_phone(raw_phone)?;
        let masked = mask_phone_number(&phone);

        match self.store.try_verify(&phone, code.trim())? {
            VerifyOutcome::Accepted => {
                tracing::info!(
                    phone = %masked,
                    event = "otp_verified",
                    "Verification code successfully verified"
                );
                Ok(Verified {
                    phone,
                    duplicate: false,
                })
            }
            VerifyOutcome::AcceptedDuplicate => {
                tracing::info!(
                    phone = %masked,
                    event = "otp_verified_duplicate",
                    "Repeated submission of an accepted code inside the grace window"
                );
                Ok(Verified {
                    phone,
                    duplicate: true,
                })
            }
            VerifyOutcome::Rejected(reason) => {
                tracing::warn!(
                    phone = %masked,
                    reason = ?reason,
                    event = "otp_rejected",
                    "Verification code rejected"
                );
                Err(reason.into())
            }
        }
    }

    /// Normalize raw input into the E.164 identity used as the store key
    pub fn normalize_phone(&self, raw_phone: &str) -> DomainResult<String> {
        to_e164(raw_phone, &self.config.default_country_code).ok_or_else(|| {
            tracing::warn!(
                phone = %mask_phone_number(raw_phone),
                event = "invalid_phone",
                "Rejected malformed phone number"
            );
            DomainError::InvalidPhone {
                phone: mask_phone_number(raw_phone),
            }
        })
    }

    /// Start the background expiry sweeper for this service's store
    pub fn start_sweeper(&self) -> SweeperHandle {
        ExpirySweeper::new(
            self.store.clone(),
            self.clock.clone(),
            self.config.sweep_interval,
        )
        .start()
    }

    /// The underlying record store
    pub fn store(&self) -> &Arc<VerificationStore> {
        &self.store
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    fn render_message(&self, code: &str) -> String {
        format!(
            "Your {} verification code is: {}. This code will expire in {} minutes.",
            self.config.brand_name,
            code,
            self.config.code_ttl.num_minutes().max(1)
        )
    }
}
