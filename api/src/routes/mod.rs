//! Route handlers
//!
//! - `verification`: send and verify one-time codes
//! - `health`: liveness and store statistics

pub mod health;
pub mod verification;
