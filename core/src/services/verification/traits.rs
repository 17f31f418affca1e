//! Traits for SMS service integration

use async_trait::async_trait;

/// Trait for the external SMS sender
///
/// The verification lifecycle depends only on this capability, never on a
/// specific provider.
#[async_trait]
pub trait SmsServiceTrait: Send + Sync {
    /// Deliver `body` to `phone` (E.164), returning the provider message ID
    async fn send_sms(&self, phone: &str, body: &str) -> Result<String, String>;
}
