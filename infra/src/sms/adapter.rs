//! SMS Service Trait Adapter
//!
//! Bridges any infrastructure [`SmsService`] onto the core `SmsServiceTrait`
//! consumed by the verification service.

use async_trait::async_trait;
use dm_core::services::verification::SmsServiceTrait;
use std::sync::Arc;

use crate::sms::sms_service::SmsService;

/// Adapter that implements the core SmsServiceTrait for an SMS provider
pub struct SmsServiceAdapter<T: SmsService + ?Sized> {
    inner: Arc<T>,
}

/// Adapter over a provider chosen at runtime
pub type DynSmsServiceAdapter = SmsServiceAdapter<dyn SmsService>;

impl<T: SmsService + ?Sized> SmsServiceAdapter<T> {
    pub fn new(inner: Arc<T>) -> Self {
        Self { inner }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &Arc<T> {
        &self.inner
    }

    pub fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

impl SmsServiceAdapter<dyn SmsService> {
    /// Wrap a provider returned by [`create_sms_service`](crate::sms::create_sms_service)
    pub fn from_boxed(inner: Box<dyn SmsService>) -> Self {
        Self {
            inner: Arc::from(inner),
        }
    }
}

#[async_trait]
impl<T: SmsService + ?Sized> SmsServiceTrait for SmsServiceAdapter<T> {
    async fn send_sms(&self, phone: &str, body: &str) -> Result<String, String> {
        self.inner
            .send_sms(phone, body)
            .await
            .map_err(|e| e.to_string())
    }
}
