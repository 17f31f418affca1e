//! One-time code generation

use rand::{rngs::OsRng, Rng};

use crate::domain::entities::verification_record::CODE_LENGTH;

/// Smallest code issued; keeps every code exactly `CODE_LENGTH` digits
pub const CODE_MIN: u32 = 100_000;

/// Largest code issued
pub const CODE_MAX: u32 = 999_999;

/// Produces fixed-width numeric secrets
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform codes in `[CODE_MIN, CODE_MAX]` drawn from the OS CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let code: u32 = OsRng.gen_range(CODE_MIN..=CODE_MAX);
        format!("{:0width$}", code, width = CODE_LENGTH)
    }
}
