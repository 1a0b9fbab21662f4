//! Registered entity records.

use crate::constants::{DOCTORS_DIR_NAME, PATIENTS_DIR_NAME};
use crate::record_id::RecordId;
use crate::RecordError;
use chrono::{DateTime, Utc};
use medrec_types::DisplayName;
use medrec_uhid::Uhid;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The kinds of entity that are assigned a UHID on creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Patient,
    Doctor,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Patient, EntityKind::Doctor];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Doctor => "doctor",
        }
    }

    pub(crate) fn dir_name(&self) -> &'static str {
        match self {
            EntityKind::Patient => PATIENTS_DIR_NAME,
            EntityKind::Doctor => DOCTORS_DIR_NAME,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(EntityKind::Patient),
            "doctor" => Ok(EntityKind::Doctor),
            other => Err(RecordError::InvalidInput(format!(
                "unknown entity kind '{}', expected 'patient' or 'doctor'",
                other
            ))),
        }
    }
}

/// A patient or doctor record as persisted in `record.yaml`.
///
/// `uhid` and `sequence` are fixed at registration; only `display_name` and `updated_at`
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEntity {
    pub record_id: RecordId,
    pub uhid: Uhid,
    pub kind: EntityKind,
    pub display_name: DisplayName,
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RegisteredEntity {
    pub(crate) fn parse(yaml: &str) -> Result<Self, RecordError> {
        serde_yaml::from_str(yaml).map_err(RecordError::YamlDeserialization)
    }

    /// Renders the record as it is stored on disk.
    pub fn render(&self) -> Result<String, RecordError> {
        serde_yaml::to_string(self).map_err(RecordError::YamlSerialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_str_is_case_insensitive() {
        assert_eq!("patient".parse::<EntityKind>().unwrap(), EntityKind::Patient);
        assert_eq!(" Doctor ".parse::<EntityKind>().unwrap(), EntityKind::Doctor);
        assert!(matches!(
            "admin".parse::<EntityKind>(),
            Err(RecordError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_record_yaml_shape() {
        let entity = RegisteredEntity {
            record_id: RecordId::parse("550e8400e29b41d4a716446655440000").unwrap(),
            uhid: Uhid::parse("RAMA000001").unwrap(),
            kind: EntityKind::Patient,
            display_name: DisplayName::new("Ram").unwrap(),
            sequence: 1,
            created_at: "2026-01-11T14:35:22Z".parse().unwrap(),
            updated_at: None,
        };

        let yaml = entity.render().unwrap();
        assert!(yaml.contains("kind: patient"));
        assert!(yaml.contains("uhid: RAMA000001"));
        assert!(yaml.contains("display_name: Ram"));
        assert!(!yaml.contains("updated_at"));

        assert_eq!(RegisteredEntity::parse(&yaml).unwrap(), entity);
    }

    #[test]
    fn test_parse_rejects_tampered_uhid() {
        let yaml = "record_id: 550e8400e29b41d4a716446655440000\n\
                    uhid: rama000001\n\
                    kind: patient\n\
                    display_name: Ram\n\
                    sequence: 1\n\
                    created_at: 2026-01-11T14:35:22Z\n";
        assert!(matches!(
            RegisteredEntity::parse(yaml),
            Err(RecordError::YamlDeserialization(_))
        ));
    }
}
