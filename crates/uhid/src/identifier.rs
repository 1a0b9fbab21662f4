//! The validated [`Uhid`] value type.

use crate::{UhidError, UhidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Exact length of a canonical UHID.
pub const UHID_LEN: usize = 10;

const LETTER_LEN: usize = 4;
const HEAD_END: usize = 7;

/// A UHID in canonical form (four uppercase letters followed by six digits).
///
/// Once constructed the contained string is guaranteed canonical, so downstream code can
/// slice it and use it in paths without re-validating.
///
/// # Construction
/// - [`UhidGenerator::generate`](crate::UhidGenerator::generate) derives a new UHID.
/// - [`Uhid::parse`] validates an externally supplied one (CLI input, stored records).
///
/// Parsing is strict: lowercase letters, separators and surrounding whitespace are all
/// rejected rather than normalised. A stored UHID is compared verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uhid(String);

impl Uhid {
    /// Validates and wraps a UHID string that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`UhidError::InvalidFormat`] if `input` is not exactly four uppercase ASCII
    /// letters followed by six ASCII digits.
    pub fn parse(input: &str) -> UhidResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(UhidError::InvalidFormat(format!(
            "UHID must be 4 uppercase letters followed by 6 digits, got: '{}'",
            input
        )))
    }

    /// Wraps an already-assembled value; the generator checks the length beforehand.
    pub(crate) fn from_generated(value: String) -> Self {
        debug_assert!(Self::is_canonical(&value));
        Self(value)
    }

    /// Returns true if `input` is a canonical UHID.
    ///
    /// A purely syntactic check, usable as a cheap pre-filter before [`Uhid::parse`].
    pub fn is_canonical(input: &str) -> bool {
        let bytes = input.as_bytes();
        bytes.len() == UHID_LEN
            && bytes[..LETTER_LEN].iter().all(u8::is_ascii_uppercase)
            && bytes[LETTER_LEN..].iter().all(u8::is_ascii_digit)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The four-letter name component.
    pub fn letters(&self) -> &str {
        &self.0[..LETTER_LEN]
    }

    /// The first three digits of the source identifier.
    pub fn head_digits(&self) -> &str {
        &self.0[LETTER_LEN..HEAD_END]
    }

    /// The last three digits of the source identifier.
    pub fn tail_digits(&self) -> &str {
        &self.0[HEAD_END..]
    }

    /// Returns `parent_dir/<l1l2>/<uhid>` where `l1l2` are the first two letters.
    ///
    /// Used for UHID index entries so that a single directory never has to hold every
    /// identifier in the system.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        parent_dir.join(&self.0[..2]).join(&self.0)
    }
}

impl fmt::Display for Uhid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uhid {
    type Err = UhidError;

    /// Equivalent to [`Uhid::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uhid::parse(s)
    }
}

impl AsRef<str> for Uhid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Uhid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uhid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Uhid::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_canonical_uhid() {
        let uhid = Uhid::parse("ABHI367990").unwrap();
        assert_eq!(uhid.to_string(), "ABHI367990");
        assert_eq!(uhid.as_str(), "ABHI367990");
    }

    #[test]
    fn test_parse_rejects_lowercase_letters() {
        let result = Uhid::parse("abhi367990");
        match result {
            Err(UhidError::InvalidFormat(msg)) => {
                assert!(msg.contains("4 uppercase letters followed by 6 digits"));
            }
            other => panic!("Expected InvalidFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(Uhid::parse("ABHI36799").is_err());
        assert!(Uhid::parse("ABHI3679900").is_err());
        assert!(Uhid::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_swapped_sections() {
        assert!(Uhid::parse("367990ABHI").is_err());
        assert!(Uhid::parse("ABH1367990").is_err());
        assert!(Uhid::parse("ABHI36799X").is_err());
    }

    #[test]
    fn test_parse_rejects_surrounding_whitespace() {
        assert!(Uhid::parse(" ABHI367990").is_err());
        assert!(Uhid::parse("ABHI367990\n").is_err());
    }

    #[test]
    fn test_parse_rejects_multibyte_input_of_same_byte_length() {
        // "É" is two bytes, so this is ten bytes but not ten ASCII characters.
        assert!(Uhid::parse("ÉBH367990").is_err());
    }

    #[test]
    fn test_component_accessors() {
        let uhid = Uhid::parse("RAMA123456").unwrap();
        assert_eq!(uhid.letters(), "RAMA");
        assert_eq!(uhid.head_digits(), "123");
        assert_eq!(uhid.tail_digits(), "456");
    }

    #[test]
    fn test_sharded_dir_structure() {
        let uhid = Uhid::parse("ABHI367990").unwrap();
        let sharded = uhid.sharded_dir(Path::new("/data/patients/index"));
        assert_eq!(
            sharded,
            PathBuf::from("/data/patients/index/AB/ABHI367990")
        );
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: Uhid = "ABCD123789".parse().unwrap();
        assert_eq!(parsed, Uhid::parse("ABCD123789").unwrap());

        let invalid: Result<Uhid, _> = "ABCD-123-789".parse();
        assert!(invalid.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trips_as_plain_string() {
        let uhid = Uhid::parse("ABHI367990").unwrap();
        let json = serde_json::to_string(&uhid).unwrap();
        assert_eq!(json, "\"ABHI367990\"");

        let back: Uhid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uhid);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_non_canonical() {
        let result: Result<Uhid, _> = serde_json::from_str("\"abhi367990\"");
        assert!(result.is_err());
    }
}
