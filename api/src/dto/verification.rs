use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    /// Phone number in any common notation; normalized to E.164 server side.
    /// Examples: "+14165551234", "(416) 555-1234", "416.555.1234"
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    /// Phone number the code was sent to, same notations as send-code
    #[validate(length(min = 1, max = 32))]
    pub phone: String,

    /// 6-digit verification code
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

/// Body of every verification endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}
