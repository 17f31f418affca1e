//! Shared utilities and common types for the DealMarket server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (environment, logging, server, verification)
//! - Phone number normalization and masking

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, Environment, LogFormat, LoggingConfig, ServerConfig,
    VerificationConfig,
};
pub use utils::phone;
