//! Shared application state

use std::sync::Arc;

use dm_core::services::verification::{SmsServiceTrait, VerificationService};

/// Application state that holds shared services
pub struct AppState<S>
where
    S: SmsServiceTrait,
{
    pub verification_service: Arc<VerificationService<S>>,
}

impl<S: SmsServiceTrait> AppState<S> {
    pub fn new(verification_service: Arc<VerificationService<S>>) -> Self {
        Self {
            verification_service,
        }
    }
}
