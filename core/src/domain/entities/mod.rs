//! Domain entities representing core business objects.

pub mod verification_record;

pub use verification_record::{
    AttemptOutcome, RecordState, VerificationRecord, CODE_LENGTH, DEFAULT_GRACE_WINDOW_SECONDS,
    DEFAULT_TTL_MINUTES,
};
