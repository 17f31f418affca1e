//! # DealMarket Core
//!
//! Core domain layer for the DealMarket phone verification subsystem.
//! This crate contains the verification record entity, the one-time code
//! store and its expiry sweeper, the verification service, and error types.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
