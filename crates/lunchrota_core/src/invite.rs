//! Admission code generation and format validation.
//!
//! # Responsibility
//! - Mint 6-character shareable codes (`[A-Z]{3}[0-9]{3}`).
//! - Normalize and validate user-entered codes.
//!
//! # Invariants
//! - The generator is stateless; uniqueness against existing codes is the
//!   caller's job (see `GroupService::create_group`).
//! - Codes are not security tokens. The 26^3 * 10^3 space is meant for
//!   human sharing, not for resisting guessing.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Total length of an admission code.
pub const CODE_LENGTH: usize = 6;

static CODE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}[0-9]{3}$").expect("valid admission code regex"));

/// Draws a fresh admission code: three uppercase letters, three digits.
///
/// Each character is drawn uniformly from its alphabet. Callers must retry
/// against the set of codes already in use until an unused one comes up.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Same as [`generate`] with an injectable RNG for deterministic tests.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_LENGTH);
    for _ in 0..3 {
        code.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
    }
    for _ in 0..3 {
        code.push(DIGITS[rng.gen_range(0..DIGITS.len())] as char);
    }
    code
}

/// Checks the exact `[A-Z]{3}[0-9]{3}` shape, case-sensitively.
///
/// User input should go through [`normalize`] first; this function does not
/// forgive lowercase or stray whitespace.
pub fn validate_format(code: &str) -> bool {
    code.chars().count() == CODE_LENGTH && CODE_FORMAT.is_match(code)
}

/// Strips all whitespace and uppercases, e.g. `" abc123 "` -> `"ABC123"`.
pub fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
