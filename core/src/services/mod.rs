//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    Clock, CodeGenerator, ExpirySweeper, ManualClock, RandomCodeGenerator, RejectReason,
    SentPhone, SmsServiceTrait, SweeperHandle, SystemClock, Verified, VerificationService,
    VerificationServiceConfig, VerificationStore, VerifyOutcome,
};
