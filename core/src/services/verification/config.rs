//! Configuration for the verification service

use chrono::Duration;
use dm_shared::config::{VerificationConfig, MAX_LIFETIME_SECONDS};

use crate::domain::entities::verification_record::{
    DEFAULT_GRACE_WINDOW_SECONDS, DEFAULT_TTL_MINUTES,
};

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// How long an issued code can be matched
    pub code_ttl: Duration,
    /// How long a consumed code still accepts duplicate submissions
    pub grace_window: Duration,
    /// Interval between expiry sweeps
    pub sweep_interval: std::time::Duration,
    /// Default upper bound on a single SMS send
    pub send_timeout: std::time::Duration,
    /// Country code applied to numbers submitted without one
    pub default_country_code: String,
    /// Number of independently locked store shards
    pub store_shards: usize,
    /// Sender name used in the SMS body
    pub brand_name: String,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
            grace_window: Duration::seconds(DEFAULT_GRACE_WINDOW_SECONDS),
            sweep_interval: std::time::Duration::from_secs(300),
            send_timeout: std::time::Duration::from_secs(10),
            default_country_code: "1".to_string(),
            store_shards: 16,
            brand_name: "DealMarket".to_string(),
        }
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_ttl: lifetime(config.code_ttl_seconds),
            grace_window: lifetime(config.grace_window_seconds),
            sweep_interval: config.sweep_interval(),
            send_timeout: config.send_timeout(),
            default_country_code: config.default_country_code.clone(),
            store_shards: config.store_shards.max(1),
            brand_name: config.brand_name.clone(),
        }
    }
}

/// Seconds to a chrono duration, clamped to the validated maximum
fn lifetime(seconds: u64) -> Duration {
    Duration::seconds(seconds.min(MAX_LIFETIME_SECONDS) as i64)
}
