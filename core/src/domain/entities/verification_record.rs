//! Verification record entity for SMS-based phone verification.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;

use crate::errors::{DomainError, DomainResult};

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default time a code stays valid for matching (10 minutes)
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// Default window after a successful match in which the same code is still accepted
pub const DEFAULT_GRACE_WINDOW_SECONDS: i64 = 30;

/// Lifecycle state of a verification record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Issued and not yet matched
    Active,
    /// Matched once; duplicates of the same code are accepted until `grace_deadline`
    Used {
        used_at: DateTime<Utc>,
        grace_deadline: DateTime<Utc>,
    },
}

/// Result of submitting a code against a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// First correct match; the record moved to `Used`
    Accepted,
    /// Repeat of the consumed code inside the grace window
    AcceptedDuplicate,
    /// The record can no longer be matched and should be dropped
    Expired,
    /// The record is live but the submitted code differs
    Mismatch,
}

/// The one live verification code for a normalized phone number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    /// Phone number in E.164 form, the store key
    pub phone: String,

    /// The 6-digit verification code
    pub code: String,

    /// Current lifecycle state
    pub state: RecordState,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp after which an active code no longer matches
    pub expires_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Creates a new active record valid for `ttl` from `issued_at`
    pub fn issue(
        phone: impl Into<String>,
        code: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        let expires_at = deadline_after(issued_at, ttl, "code TTL")?;
        Ok(Self {
            phone: phone.into(),
            code: code.into(),
            state: RecordState::Active,
            issued_at,
            expires_at,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RecordState::Active)
    }

    pub fn used_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RecordState::Active => None,
            RecordState::Used { used_at, .. } => Some(used_at),
        }
    }

    pub fn grace_deadline(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RecordState::Active => None,
            RecordState::Used { grace_deadline, .. } => Some(grace_deadline),
        }
    }

    /// The instant after which the record must not exist: `max(expires_at, grace_deadline)`
    pub fn retention_deadline(&self) -> DateTime<Utc> {
        match self.grace_deadline() {
            Some(grace_deadline) => self.expires_at.max(grace_deadline),
            None => self.expires_at,
        }
    }

    /// Whether the sweeper may drop this record at `now`
    pub fn is_past_retention(&self, now: DateTime<Utc>) -> bool {
        now > self.retention_deadline()
    }

    /// Compare a submitted code against the stored one in constant time
    pub fn matches(&self, submitted: &str) -> bool {
        submitted.len() == self.code.len()
            && constant_time_eq(submitted.as_bytes(), self.code.as_bytes())
    }

    /// Apply a submitted code at `now`.
    ///
    /// Only the first match of an active record mutates it. A used record
    /// whose grace window has closed reports `Expired` whatever the code.
    /// A grace deadline outside the representable range is an error and
    /// leaves the record untouched.
    pub fn attempt(
        &mut self,
        submitted: &str,
        now: DateTime<Utc>,
        grace_window: Duration,
    ) -> DomainResult<AttemptOutcome> {
        let outcome = match self.state {
            RecordState::Active => {
                if now > self.expires_at {
                    AttemptOutcome::Expired
                } else if self.matches(submitted) {
                    self.state = RecordState::Used {
                        used_at: now,
                        grace_deadline: deadline_after(now, grace_window, "grace window")?,
                    };
                    AttemptOutcome::Accepted
                } else {
                    AttemptOutcome::Mismatch
                }
            }
            RecordState::Used { grace_deadline, .. } => {
                if now >= grace_deadline {
                    AttemptOutcome::Expired
                } else if self.matches(submitted) {
                    AttemptOutcome::AcceptedDuplicate
                } else {
                    AttemptOutcome::Mismatch
                }
            }
        };
        Ok(outcome)
    }
}

fn deadline_after(start: DateTime<Utc>, span: Duration, what: &str) -> DomainResult<DateTime<Utc>> {
    start
        .checked_add_signed(span)
        .ok_or_else(|| DomainError::Internal {
            message: format!("{} of {}s overflows the timestamp range", what, span.num_seconds()),
        })
}
