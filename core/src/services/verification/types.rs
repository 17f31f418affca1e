//! Types for verification service results

use chrono::{DateTime, Utc};

/// Result of issuing and delivering a verification code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPhone {
    /// The normalized phone number the code was sent to
    pub phone: String,
    /// The SMS message ID from the provider
    pub message_id: String,
    /// When the issued code stops matching
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    /// The normalized phone number that was verified
    pub phone: String,
    /// True when this was a repeat of an already accepted code
    pub duplicate: bool,
}
