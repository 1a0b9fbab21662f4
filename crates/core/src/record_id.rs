//! Internal record identifiers and the sharded storage layout derived from them.
//!
//! A UHID is a display label and is not unique by construction, so records are stored under
//! a separate random identifier: a v4 UUID in *canonical* form, **32 lowercase hexadecimal
//! characters** with no hyphens (for example `550e8400e29b41d4a716446655440000`).
//!
//! ## Sharded directory layout
//! For a canonical id `u`, a record lives under:
//! `<entity_dir>/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `medrec_data/patients/55/0e/550e8400e29b41d4a716446655440000/record.yaml`
//!
//! The two shard levels keep any single directory from growing with the record count.

use crate::{RecordError, RecordResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Canonical record identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed the value is guaranteed canonical, so it can be used to derive storage
/// paths directly.
///
/// - [`RecordId::new`] allocates a fresh id for a new record.
/// - [`RecordId::parse`] validates an id read from an index entry or supplied by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a new random record id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates a record id that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> RecordResult<Self> {
        let invalid = || {
            RecordError::InvalidInput(format!(
                "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            ))
        };

        if !Self::is_canonical(input) {
            return Err(invalid());
        }
        Uuid::parse_str(input).map(Self).map_err(|_| invalid())
    }

    /// Returns true if `input` is 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first four hex characters.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.to_string();
        parent_dir
            .join(&canonical[0..2])
            .join(&canonical[2..4])
            .join(&canonical)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = RecordId::new();
        assert!(RecordId::is_canonical(&id.to_string()));
    }

    #[test]
    fn test_parse_round_trips_display() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let id = RecordId::parse(canonical).unwrap();
        assert_eq!(id.to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_and_uppercase() {
        let err = RecordId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap_err();
        match err {
            RecordError::InvalidInput(msg) => assert!(msg.contains("32 lowercase hex")),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
        assert!(RecordId::parse("550E8400E29B41D4A716446655440000").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_characters() {
        assert!(RecordId::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(RecordId::parse("550e8400e29b41d4a716446655440zzz").is_err());
        assert!(RecordId::parse("").is_err());
    }

    #[test]
    fn test_sharded_dir_structure() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(
            id.sharded_dir(Path::new("/data/patients")),
            PathBuf::from("/data/patients/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let id = RecordId::parse("00112233445566778899aabbccddeeff").unwrap();
        let yaml = serde_yaml::to_string(&id).unwrap();
        assert!(yaml.contains("00112233445566778899aabbccddeeff"));

        let back: RecordId = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, id);
    }
}
