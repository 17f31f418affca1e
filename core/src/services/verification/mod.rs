//! Verification service module for SMS-based phone verification
//!
//! This module provides the complete one-time code lifecycle:
//! - Code generation from an OS-backed random source
//! - A sharded in-memory store with per-phone atomic check-and-transition
//! - A background sweeper that reclaims expired records
//! - The service composing both with an external SMS sender

mod clock;
mod code_generator;
mod config;
mod service;
mod store;
mod sweeper;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use code_generator::{CodeGenerator, RandomCodeGenerator, CODE_MAX, CODE_MIN};
pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use store::{RejectReason, VerificationStore, VerifyOutcome};
pub use sweeper::{ExpirySweeper, SweepTarget, SweeperHandle};
pub use traits::SmsServiceTrait;
pub use types::{SentPhone, Verified};
