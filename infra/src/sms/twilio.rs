//! Twilio SMS Service Implementation
//!
//! Sends SMS through the Twilio Messages REST API over HTTPS.
//!
//! ## Features
//!
//! - E.164 recipient validation before any network call
//! - Bounded retry with exponential backoff on rate limiting, 5xx responses
//!   and connection failures
//! - Client errors (4xx other than 429) fail immediately
//! - Phone number masking in logs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{
    config::SmsConfig,
    sms::sms_service::{is_valid_phone_number, mask_phone_number, validate_outbound, SmsService},
    InfrastructureError,
};

const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// Maximum attempts per message, including the first
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
    /// API root, overridable for regional endpoints
    pub api_base_url: String,
}

impl TwilioConfig {
    /// Create configuration from `TWILIO_*` environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::from_env_with_prefix("TWILIO")
    }

    /// Create configuration from `{prefix}_ACCOUNT_SID`, `{prefix}_AUTH_TOKEN`
    /// and friends
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, InfrastructureError> {
        let required = |name: &str| {
            let key = format!("{}_{}", prefix, name);
            std::env::var(&key)
                .map_err(|_| InfrastructureError::Config(format!("{} not set", key)))
        };
        let optional = |name: &str| std::env::var(format!("{}_{}", prefix, name)).ok();

        let config = Self {
            account_sid: required("ACCOUNT_SID")?,
            auth_token: required("AUTH_TOKEN")?,
            from_number: required("FROM_NUMBER")?,
            max_retries: optional("MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: optional("RETRY_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            request_timeout_secs: optional("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            api_base_url: optional("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Build from the generic SMS settings
    pub fn from_sms_config(sms: &SmsConfig) -> Result<Self, InfrastructureError> {
        let config = Self {
            account_sid: sms.api_key.clone(),
            auth_token: sms.api_secret.clone(),
            from_number: sms.from_number.clone(),
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), InfrastructureError> {
        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(InfrastructureError::Config(
                "Twilio account SID and auth token are required".to_string(),
            ));
        }

        if !is_valid_phone_number(&self.from_number) {
            return Err(InfrastructureError::Config(
                "Twilio from number must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: String,
}

/// Whether a Twilio response status is worth another attempt
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioSmsService {
    /// Create a new Twilio SMS service
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_phone_number(&config.from_number),
            "Twilio SMS service initialized"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(TwilioConfig::from_env()?)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Send SMS with retry logic
    async fn send_with_retry(&self, to: &str, message: &str) -> Result<String, InfrastructureError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;

            debug!(
                attempt = attempts,
                max_attempts,
                phone = %mask_phone_number(to),
                "Sending SMS via Twilio"
            );

            let response = self
                .client
                .post(self.messages_url())
                .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
                .form(&[
                    ("To", to),
                    ("From", self.config.from_number.as_str()),
                    ("Body", message),
                ])
                .send()
                .await;

            let failure = match response {
                Ok(resp) if resp.status().is_success() => {
                    let body: TwilioMessageResponse = resp.json().await?;
                    info!(
                        phone = %mask_phone_number(to),
                        message_sid = %body.sid,
                        "SMS sent successfully via Twilio"
                    );
                    return Ok(body.sid);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let detail = match resp.json::<TwilioErrorResponse>().await {
                        Ok(err) => match err.code {
                            Some(code) => format!("{} (code {})", err.message, code),
                            None => err.message,
                        },
                        Err(_) => status.to_string(),
                    };

                    if !is_retryable_status(status) {
                        error!(
                            status = status.as_u16(),
                            error = %detail,
                            "Twilio rejected SMS request"
                        );
                        return Err(InfrastructureError::Sms(format!(
                            "Invalid request ({}): {}",
                            status.as_u16(),
                            detail
                        )));
                    }

                    format!("{}: {}", status.as_u16(), detail)
                }
                Err(e) if e.is_timeout() || e.is_connect() => e.to_string(),
                Err(e) => return Err(InfrastructureError::Http(e)),
            };

            error!(
                attempt = attempts,
                max_attempts,
                error = %failure,
                "Failed to send SMS via Twilio"
            );

            if attempts >= max_attempts {
                return Err(InfrastructureError::Sms(format!(
                    "Failed to send SMS after {} attempts: {}",
                    attempts, failure
                )));
            }

            warn!(delay_ms = delay.as_millis() as u64, "Retrying Twilio request");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl SmsService for TwilioSmsService {
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError> {
        validate_outbound(phone_number, message)?;

        info!(
            phone = %mask_phone_number(phone_number),
            message_length = message.len(),
            "Sending SMS via Twilio"
        );

        self.send_with_retry(phone_number, message).await
    }

    fn provider_name(&self) -> &str {
        "Twilio"
    }
}
