//! SMS Service Interface
//!
//! Defines the trait for SMS provider implementations that deliver
//! verification messages.

use async_trait::async_trait;

use crate::InfrastructureError;

pub use dm_shared::phone::{is_valid_e164 as is_valid_phone_number, mask_phone_number};

/// Longest body accepted by any provider (Twilio's concatenated SMS limit)
pub const MAX_MESSAGE_LENGTH: usize = 1600;

/// SMS service trait for sending text messages
///
/// Implementations include:
/// - Twilio SMS API
/// - Failover between two providers
/// - Mock implementation for development
#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send an SMS message to a phone number
    ///
    /// # Arguments
    ///
    /// * `phone_number` - The recipient's phone number (E.164 format)
    /// * `message` - The message content to send
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Provider identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError>;

    /// Get the service provider name ("Twilio", "Failover", "Mock")
    fn provider_name(&self) -> &str;

    /// Check if the service is available
    ///
    /// Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Reject recipients and bodies no provider would accept
pub fn validate_outbound(phone_number: &str, message: &str) -> Result<(), InfrastructureError> {
    if !is_valid_phone_number(phone_number) {
        return Err(InfrastructureError::Sms(format!(
            "Invalid phone number format: {}",
            mask_phone_number(phone_number)
        )));
    }

    if message.is_empty() || message.len() > MAX_MESSAGE_LENGTH {
        return Err(InfrastructureError::Sms(format!(
            "Message length must be between 1 and {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }

    Ok(())
}
