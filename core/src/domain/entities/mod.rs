//! Domain entities representing core business objects.

pub mod verification_code;

pub use verification_code::{attempts_key, code_key, VerificationCode, ATTEMPTS_KEY_SUFFIX, CODE_LENGTH};
