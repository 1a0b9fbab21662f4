//! Unique Health Identifier (UHID) generation and validation.
//!
//! Every patient and doctor record carries a UHID: a short, human-facing label derived once
//! from the entity's display name and a numeric identifier (usually a zero-padded sequence
//! number). It is used for display and lookup convenience only; it is **not** a security token
//! and it is not unique by construction.
//!
//! ## Canonical UHID form
//! - Length: 10
//! - Characters `0..4`: uppercase `A-Z`
//! - Characters `4..10`: `0-9`
//! - Example: `ABHI367990`
//!
//! ## Derivation
//! For a name `n` and numeric identifier `i`:
//! 1. `i` is stripped to ASCII digits; fewer than six digits is an error.
//! 2. `n` is stripped to ASCII letters and upper-cased; the first four are kept.
//! 3. Short names are padded from the alphabet, restarting at `A` (see [`UhidGenerator`]).
//! 4. The first three and last three digits follow the letters.
//!
//! Uniqueness is entirely the caller's concern: two entities fed the same numeric identifier
//! and names sharing the same four leading letters get the same UHID.
//!
//! This crate provides:
//! - [`UhidGenerator`] (and the [`generate`] shorthand), the pure derivation.
//! - [`Uhid`], a wrapper that *guarantees* the canonical form once constructed.

mod generator;
mod identifier;

pub use generator::{generate, UhidGenerator, MIN_ID_DIGITS};
pub use identifier::{Uhid, UHID_LEN};

/// Error type for UHID operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UhidError {
    /// A required input was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The numeric identifier did not contain enough digits.
    #[error("identifier must contain at least {required} digits, found {found}")]
    InsufficientLength { required: usize, found: usize },
    /// The assembled identifier was not exactly ten characters long.
    #[error("generated UHID has length {0}, expected 10")]
    GenerationInvariantViolation(usize),
    /// An externally supplied UHID was not in canonical form.
    #[error("invalid UHID: {0}")]
    InvalidFormat(String),
}

/// Result type for UHID operations.
pub type UhidResult<T> = Result<T, UhidError>;
