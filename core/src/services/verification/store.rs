//! Sharded in-memory store for verification records
//!
//! Records are spread over independently locked shards keyed by a hash of the
//! normalized phone number. Every operation on one phone runs inside a single
//! short critical section of that phone's shard, so operations are
//! linearizable per phone while unrelated phones rarely contend.

use chrono::{DateTime, Duration, Utc};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing;

use dm_shared::phone::mask_phone_number;

use crate::domain::entities::verification_record::{
    AttemptOutcome, RecordState, VerificationRecord,
};
use crate::errors::{DomainError, DomainResult};

use super::clock::Clock;

type Shard = HashMap<String, VerificationRecord>;

/// Why a submitted code was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No record exists for the phone
    NotFound,
    /// The record is past its TTL, or past its grace window once used
    Expired,
    /// The record is live but the submitted code differs
    Mismatch,
}

/// Decision taken by [`VerificationStore::try_verify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// First correct match; the record is now used
    Accepted,
    /// Repeat of the consumed code within the grace window
    AcceptedDuplicate,
    Rejected(RejectReason),
}

impl VerifyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerifyOutcome::Accepted | VerifyOutcome::AcceptedDuplicate)
    }
}

/// Single source of truth for verification records
pub struct VerificationStore {
    shards: Box<[Mutex<Shard>]>,
    hasher: RandomState,
    grace_window: Duration,
    clock: Arc<dyn Clock>,
}

impl VerificationStore {
    /// Create a store with `shard_count` shards (at least one)
    pub fn new(shard_count: usize, grace_window: Duration, clock: Arc<dyn Clock>) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(Shard::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            hasher: RandomState::new(),
            grace_window,
            clock,
        }
    }

    fn shard_for(&self, phone: &str) -> DomainResult<MutexGuard<'_, Shard>> {
        let index = (self.hasher.hash_one(phone) % self.shards.len() as u64) as usize;
        self.shards[index].lock().map_err(|_| {
            tracing::error!(
                shard = index,
                event = "otp_store_poisoned",
                "Verification store shard lock is poisoned"
            );
            DomainError::Internal {
                message: format!("verification store shard {} is poisoned", index),
            }
        })
    }

    /// Install a new active record, replacing any prior record for the phone.
    ///
    /// Returns the expiry of the installed code.
    pub fn put(&self, phone: &str, code: &str, ttl: Duration) -> DomainResult<DateTime<Utc>> {
        let record = VerificationRecord::issue(phone, code, self.clock.now(), ttl)?;
        let expires_at = record.expires_at;

        let superseded = self.shard_for(phone)?.insert(phone.to_string(), record);

        if let Some(previous) = superseded {
            tracing::debug!(
                phone = %mask_phone_number(phone),
                previous_state = ?previous.state,
                event = "otp_superseded",
                "Replaced existing verification record"
            );
        }

        Ok(expires_at)
    }

    /// Delete the record for `phone` if present
    pub fn remove(&self, phone: &str) -> DomainResult<bool> {
        Ok(self.shard_for(phone)?.remove(phone).is_some())
    }

    /// Delete the record for `phone` only while it is still the active record
    /// holding `code`. A record installed by a later request is left alone.
    pub fn remove_if_code(&self, phone: &str, code: &str) -> DomainResult<bool> {
        let mut shard = self.shard_for(phone)?;
        let owned = shard
            .get(phone)
            .map(|record| record.is_active() && record.matches(code))
            .unwrap_or(false);
        if owned {
            shard.remove(phone);
        }
        Ok(owned)
    }

    /// The single atomic decision point for a submitted code.
    ///
    /// Only a first match mutates the record. An expired record found here is
    /// removed on the spot.
    pub fn try_verify(&self, phone: &str, submitted: &str) -> DomainResult<VerifyOutcome> {
        let now = self.clock.now();
        let mut shard = self.shard_for(phone)?;

        let Some(record) = shard.get_mut(phone) else {
            return Ok(VerifyOutcome::Rejected(RejectReason::NotFound));
        };

        let outcome = match record.attempt(submitted, now, self.grace_window)? {
            AttemptOutcome::Accepted => VerifyOutcome::Accepted,
            AttemptOutcome::AcceptedDuplicate => VerifyOutcome::AcceptedDuplicate,
            AttemptOutcome::Mismatch => VerifyOutcome::Rejected(RejectReason::Mismatch),
            AttemptOutcome::Expired => {
                shard.remove(phone);
                VerifyOutcome::Rejected(RejectReason::Expired)
            }
        };

        Ok(outcome)
    }

    /// Remove every record past `max(expires_at, grace_deadline)` at `now`.
    ///
    /// Shards are locked one at a time. A poisoned shard is skipped and
    /// reported as an error after the remaining shards are swept.
    pub fn sweep(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut removed = 0;
        let mut poisoned = 0;

        for shard in self.shards.iter() {
            match shard.lock() {
                Ok(mut shard) => {
                    let before = shard.len();
                    shard.retain(|_, record| !record.is_past_retention(now));
                    removed += before - shard.len();
                }
                Err(_) => poisoned += 1,
            }
        }

        if poisoned > 0 {
            return Err(DomainError::Internal {
                message: format!(
                    "{} verification store shard(s) poisoned; removed {} record(s) from the rest",
                    poisoned, removed
                ),
            });
        }

        Ok(removed)
    }

    /// Current lifecycle state of the record for `phone`, if any
    pub fn state_of(&self, phone: &str) -> DomainResult<Option<RecordState>> {
        Ok(self.shard_for(phone)?.get(phone).map(|record| record.state))
    }

    pub fn contains(&self, phone: &str) -> DomainResult<bool> {
        Ok(self.shard_for(phone)?.contains_key(phone))
    }

    /// Number of records across all readable shards
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|shard| shard.lock().ok().map(|shard| shard.len()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl std::fmt::Debug for VerificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationStore")
            .field("shards", &self.shards.len())
            .field("grace_window", &self.grace_window)
            .finish_non_exhaustive()
    }
}
