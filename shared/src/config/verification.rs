//! Phone verification configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

/// Upper bound for the code TTL and the grace window (one day)
pub const MAX_LIFETIME_SECONDS: u64 = 86_400;

/// One-time code lifecycle settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// How long an issued code can be matched, in seconds
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: u64,

    /// How long a consumed code still accepts duplicate submissions, in seconds
    #[serde(default = "default_grace_window")]
    pub grace_window_seconds: u64,

    /// Interval between expiry sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Upper bound on a single SMS send, in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,

    /// Country code applied to numbers submitted without one
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Number of independently locked shards in the code store
    #[serde(default = "default_store_shards")]
    pub store_shards: usize,

    /// Sender name used in the SMS body
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: default_code_ttl(),
            grace_window_seconds: default_grace_window(),
            sweep_interval_seconds: default_sweep_interval(),
            send_timeout_seconds: default_send_timeout(),
            default_country_code: default_country_code(),
            store_shards: default_store_shards(),
            brand_name: default_brand_name(),
        }
    }
}

impl VerificationConfig {
    /// Load configuration from `OTP_*` environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_ttl_seconds: env_or("OTP_CODE_TTL_SECONDS", defaults.code_ttl_seconds),
            grace_window_seconds: env_or("OTP_GRACE_WINDOW_SECONDS", defaults.grace_window_seconds),
            sweep_interval_seconds: env_or(
                "OTP_SWEEP_INTERVAL_SECONDS",
                defaults.sweep_interval_seconds,
            ),
            send_timeout_seconds: env_or("OTP_SEND_TIMEOUT_SECONDS", defaults.send_timeout_seconds),
            default_country_code: std::env::var("OTP_DEFAULT_COUNTRY_CODE")
                .unwrap_or(defaults.default_country_code),
            store_shards: env_or("OTP_STORE_SHARDS", defaults.store_shards),
            brand_name: std::env::var("OTP_BRAND_NAME").unwrap_or(defaults.brand_name),
        }
    }

    /// Reject settings the verification lifecycle cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "code_ttl_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        for (field, value) in [
            ("code_ttl_seconds", self.code_ttl_seconds),
            ("grace_window_seconds", self.grace_window_seconds),
        ] {
            if value > MAX_LIFETIME_SECONDS {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: format!("must not exceed {} seconds", MAX_LIFETIME_SECONDS),
                });
            }
        }
        if self.sweep_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.store_shards == 0 {
            return Err(ConfigError::Invalid {
                field: "store_shards".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        let country_code = self.default_country_code.trim_start_matches('+');
        if country_code.is_empty()
            || country_code.len() > 3
            || !country_code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid {
                field: "default_country_code".to_string(),
                reason: format!("'{}' is not a dialing code", self.default_country_code),
            });
        }
        Ok(())
    }

    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }

    pub fn grace_window(&self) -> Duration {
        Duration::from_secs(self.grace_window_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_seconds)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_code_ttl() -> u64 {
    600 // 10 minutes
}

fn default_grace_window() -> u64 {
    30
}

fn default_sweep_interval() -> u64 {
    300 // 5 minutes
}

fn default_send_timeout() -> u64 {
    10
}

fn default_country_code() -> String {
    String::from("1")
}

fn default_store_shards() -> usize {
    16
}

fn default_brand_name() -> String {
    String::from("DealMarket")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VerificationConfig::default();
        assert_eq!(config.code_ttl(), Duration::from_secs(600));
        assert_eq!(config.grace_window(), Duration::from_secs(30));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.default_country_code, "1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = VerificationConfig {
            code_ttl_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerificationConfig {
            store_shards: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerificationConfig {
            sweep_interval_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_country_code() {
        let config = VerificationConfig {
            default_country_code: "+44".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = VerificationConfig {
            default_country_code: "uk".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_country_code"));
    }

    #[test]
    fn test_validate_caps_lifetimes_at_one_day() {
        let config = VerificationConfig {
            code_ttl_seconds: MAX_LIFETIME_SECONDS,
            grace_window_seconds: MAX_LIFETIME_SECONDS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = VerificationConfig {
            grace_window_seconds: 10_000_000_000_000,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("grace_window_seconds"));

        let config = VerificationConfig {
            code_ttl_seconds: MAX_LIFETIME_SECONDS + 1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("code_ttl_seconds"));
    }

    #[test]
    fn test_zero_grace_window_is_allowed() {
        let config = VerificationConfig {
            grace_window_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.grace_window(), Duration::ZERO);
    }
}
