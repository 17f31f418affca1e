pub mod verification;

pub use verification::{SendCodeRequest, VerificationResponse, VerifyCodeRequest};
