//! The UHID derivation itself.

use crate::identifier::{Uhid, UHID_LEN};
use crate::{UhidError, UhidResult};

/// Minimum number of digits the numeric identifier must contain after stripping.
pub const MIN_ID_DIGITS: usize = 6;

const LETTER_LEN: usize = 4;
const DIGIT_WINDOW: usize = 3;

/// Derives UHIDs from a display name and a numeric identifier.
///
/// The derivation is pure: no I/O, no shared state, identical inputs always give identical
/// output. It performs no collision checking; callers own the uniqueness of the numeric
/// identifier they pass in.
///
/// # Letter component
/// Non-letters are dropped from the name and the first four remaining letters are
/// upper-cased. A name with fewer than four letters is padded from the alphabet starting at
/// `A`, wrapping after `Z`. A fill letter equal to the character immediately before it is
/// skipped, so `"A"` pads to `ABCD` while `"Ram"` pads to `RAMA`.
///
/// Because of that skip, names whose letters end in `A` do not pad with a literal restart at
/// `A`: `"Ra"` gives `RABC`, not `RAAB`, and `"Aa"` gives `AABC`. Identifiers produced by a
/// plain restart-at-`A` fill will differ for such names.
///
/// # Digit component
/// Non-digits are dropped from the identifier. The first three and the last three digits are
/// appended; for a six-digit identifier the two windows are adjacent.
#[derive(Clone, Copy, Debug, Default)]
pub struct UhidGenerator;

impl UhidGenerator {
    /// Generates the UHID for `name` and `id`.
    ///
    /// # Errors
    ///
    /// - [`UhidError::InvalidArgument`] if `name` or `id` is empty.
    /// - [`UhidError::InsufficientLength`] if `id` has fewer than [`MIN_ID_DIGITS`] digits.
    /// - [`UhidError::GenerationInvariantViolation`] if the assembled value is not ten
    ///   characters; unreachable given the checks above.
    pub fn generate(name: &str, id: &str) -> UhidResult<Uhid> {
        if name.is_empty() {
            return Err(UhidError::InvalidArgument("name is required".into()));
        }
        if id.is_empty() {
            return Err(UhidError::InvalidArgument("id is required".into()));
        }

        let digits: Vec<char> = id.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < MIN_ID_DIGITS {
            return Err(UhidError::InsufficientLength {
                required: MIN_ID_DIGITS,
                found: digits.len(),
            });
        }

        let mut result = letter_part(name);
        result.extend(&digits[..DIGIT_WINDOW]);
        result.extend(&digits[digits.len() - DIGIT_WINDOW..]);

        if result.len() != UHID_LEN {
            return Err(UhidError::GenerationInvariantViolation(result.len()));
        }

        Ok(Uhid::from_generated(result))
    }
}

/// Shorthand for [`UhidGenerator::generate`].
pub fn generate(name: &str, id: &str) -> UhidResult<Uhid> {
    UhidGenerator::generate(name, id)
}

fn letter_part(name: &str) -> String {
    let mut letters: String = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(LETTER_LEN)
        .collect();

    let mut fill = (b'A'..=b'Z').map(char::from).cycle();
    while letters.len() < LETTER_LEN {
        let Some(next) = fill.next() else { break };
        if letters.ends_with(next) {
            continue;
        }
        letters.push(next);
    }

    letters
}
