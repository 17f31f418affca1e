//! Phone verification route handlers
//!
//! - `POST /api/v1/verification/send-code`
//! - `POST /api/v1/verification/verify-code`

pub mod send_code;
pub mod verify_code;

pub use send_code::send_code;
pub use verify_code::verify_code;
