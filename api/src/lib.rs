//! HTTP surface for phone verification
//!
//! Exposes the two verification operations plus a health check. The binary in
//! `main.rs` wires configuration, the SMS provider, the verification service
//! and its sweeper together; tests build the same app around mock providers.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use state::AppState;
