//! Domain-specific error types and error handling.

use thiserror::Error;

use crate::services::verification::RejectReason;

/// Phone verification errors
///
/// Everything except `Internal` is an expected outcome of user input or of
/// the SMS provider, returned as a typed value rather than treated as a fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid phone number: {phone}")]
    InvalidPhone { phone: String },

    #[error("Failed to send verification code: {reason}")]
    SendFailed { reason: String },

    #[error("No verification code found")]
    NotFound,

    #[error("Verification code expired")]
    Expired,

    #[error("Verification code does not match")]
    Mismatch,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Stable snake_case reason code exposed to API clients
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::InvalidPhone { .. } => "invalid_phone",
            DomainError::SendFailed { .. } => "send_failed",
            DomainError::NotFound => "not_found",
            DomainError::Expired => "expired",
            DomainError::Mismatch => "mismatch",
            DomainError::Internal { .. } => "internal_error",
        }
    }

    /// True for the verification rejections a wrong or stale code produces
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound | DomainError::Expired | DomainError::Mismatch
        )
    }

    /// True only for faults that indicate a defect rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Internal { .. })
    }
}

impl From<RejectReason> for DomainError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::NotFound => DomainError::NotFound,
            RejectReason::Expired => DomainError::Expired,
            RejectReason::Mismatch => DomainError::Mismatch,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(
            DomainError::InvalidPhone { phone: "abc".to_string() }.reason(),
            "invalid_phone"
        );
        assert_eq!(
            DomainError::SendFailed { reason: "timeout".to_string() }.reason(),
            "send_failed"
        );
        assert_eq!(DomainError::NotFound.reason(), "not_found");
        assert_eq!(DomainError::Expired.reason(), "expired");
        assert_eq!(DomainError::Mismatch.reason(), "mismatch");
    }

    #[test]
    fn test_rejection_classification() {
        assert!(DomainError::Mismatch.is_rejection());
        assert!(DomainError::Expired.is_rejection());
        assert!(DomainError::NotFound.is_rejection());
        assert!(!DomainError::SendFailed { reason: String::new() }.is_rejection());

        let internal = DomainError::Internal { message: "poisoned".to_string() };
        assert!(internal.is_internal());
        assert!(!internal.is_rejection());
    }

    #[test]
    fn test_from_reject_reason() {
        assert_eq!(DomainError::from(RejectReason::Expired), DomainError::Expired);
        assert_eq!(DomainError::from(RejectReason::Mismatch), DomainError::Mismatch);
        assert_eq!(DomainError::from(RejectReason::NotFound), DomainError::NotFound);
    }
}
