//! # Infrastructure Layer
//!
//! Concrete implementations of the external collaborators the phone
//! verification core depends on.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **SMS**: provider integrations (Twilio over HTTPS, mock, failover) and the
//!   adapter that exposes any provider as the core `SmsServiceTrait`
//! - **Configuration**: SMS provider settings loaded from the environment
//!
//! ## Features
//!
//! - `twilio-sms`: Enable the Twilio SMS provider (default)

/// SMS service module - External SMS providers
pub mod sms;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services
    //!
    //! Handles SMS provider selection and credentials.

    use serde::{Deserialize, Serialize};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// SMS service configuration
        pub sms: SmsConfig,
    }

    /// SMS service configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SmsConfig {
        /// SMS service provider ("twilio", "failover", "mock")
        pub provider: String,
        /// API credentials
        pub api_key: String,
        /// API secret/token
        pub api_secret: String,
        /// From phone number
        pub from_number: String,
    }

    impl Default for SmsConfig {
        fn default() -> Self {
            Self {
                provider: "mock".to_string(),
                api_key: String::new(),
                api_secret: String::new(),
                from_number: "+15550000000".to_string(),
            }
        }
    }

    impl SmsConfig {
        /// Load SMS settings from `SMS_*` environment variables
        pub fn from_env() -> Self {
            let defaults = Self::default();
            Self {
                provider: std::env::var("SMS_PROVIDER")
                    .map(|p| p.trim().to_lowercase())
                    .unwrap_or(defaults.provider),
                api_key: std::env::var("SMS_API_KEY").unwrap_or_default(),
                api_secret: std::env::var("SMS_API_SECRET").unwrap_or_default(),
                from_number: std::env::var("SMS_FROM_NUMBER").unwrap_or(defaults.from_number),
            }
        }
    }
}

/// Load infrastructure configuration from environment
pub fn load_config() -> Result<config::InfrastructureConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let sms = config::SmsConfig::from_env();
    if sms.provider.is_empty() {
        return Err(InfrastructureError::Config(
            "SMS_PROVIDER must not be empty".to_string(),
        ));
    }

    Ok(config::InfrastructureConfig { sms })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),
}
