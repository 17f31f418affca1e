//! SMS Service Module
//!
//! SMS provider implementations used to deliver verification codes.
//!
//! ## Features
//!
//! - **SMS Service Trait**: Common interface for all SMS providers
//! - **Mock Implementation**: Console output for development
//! - **Twilio Support**: Production SMS via the Twilio REST API
//! - **Failover**: Primary/backup switching with automatic recovery
//! - **Adapter**: Exposes any provider as the core `SmsServiceTrait`

use std::time::Duration;

pub mod adapter;
pub mod failover_sms;
pub mod mock_sms;
pub mod sms_service;

// Twilio SMS service (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

// Re-export commonly used types
pub use adapter::{DynSmsServiceAdapter, SmsServiceAdapter};
pub use failover_sms::FailoverSmsService;
pub use mock_sms::MockSmsService;
pub use sms_service::{is_valid_phone_number, mask_phone_number, SmsService};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsService};

use crate::{config::SmsConfig, InfrastructureError};

#[cfg(test)]
mod tests;

/// How long the failover service stays on its backup before retrying the primary
pub const FAILOVER_RECOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an SMS service based on configuration
///
/// Returns the provider named by `config.provider`. Unknown providers fall
/// back to the mock implementation; a misconfigured real provider is an error.
pub fn create_sms_service(config: &SmsConfig) -> Result<Box<dyn SmsService>, InfrastructureError> {
    match config.provider.as_str() {
        "mock" => Ok(Box::new(MockSmsService::new())),
        #[cfg(feature = "twilio-sms")]
        "twilio" => {
            // Generic SMS_* credentials win over TWILIO_* when present
            let twilio_config = if config.api_key.is_empty() {
                TwilioConfig::from_env()?
            } else {
                TwilioConfig::from_sms_config(config)?
            };
            Ok(Box::new(TwilioSmsService::new(twilio_config)?))
        }
        #[cfg(feature = "twilio-sms")]
        "failover" => create_failover_sms_service(),
        other => {
            tracing::warn!(
                provider = other,
                "Unknown SMS provider, using mock implementation"
            );
            Ok(Box::new(MockSmsService::new()))
        }
    }
}

/// Create a failover SMS service over two Twilio accounts
///
/// The primary comes from `TWILIO_*`, the backup from `TWILIO_BACKUP_*`.
/// With only one of them configured the failover layer is skipped.
#[cfg(feature = "twilio-sms")]
pub fn create_failover_sms_service() -> Result<Box<dyn SmsService>, InfrastructureError> {
    let build = |prefix: &str| -> Option<Box<dyn SmsService>> {
        match TwilioConfig::from_env_with_prefix(prefix).and_then(TwilioSmsService::new) {
            Ok(service) => Some(Box::new(service)),
            Err(e) => {
                tracing::warn!(prefix, error = %e, "SMS provider unavailable for failover");
                None
            }
        }
    };

    match (build("TWILIO"), build("TWILIO_BACKUP")) {
        (Some(primary), Some(backup)) => {
            tracing::info!("Created failover SMS service with primary and backup Twilio accounts");
            Ok(Box::new(FailoverSmsService::new(
                primary,
                backup,
                FAILOVER_RECOVERY_TIMEOUT,
            )))
        }
        (Some(service), None) | (None, Some(service)) => {
            tracing::warn!("Only one SMS service available, failover disabled");
            Ok(service)
        }
        (None, None) => Err(InfrastructureError::Config(
            "Failover SMS provider needs TWILIO_* or TWILIO_BACKUP_* credentials".to_string(),
        )),
    }
}
