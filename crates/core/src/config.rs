//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services as an
//! `Arc<CoreConfig>`. Services never read environment variables themselves, which keeps
//! behaviour consistent across threads and test harnesses.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_SEQUENCE_WIDTH, MAX_SEQUENCE_WIDTH, SEQUENCE_FILENAME,
    UHID_INDEX_DIR_NAME,
};
use crate::entity::EntityKind;
use crate::{RecordError, RecordResult};
use medrec_uhid::MIN_ID_DIGITS;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    sequence_width: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] if `sequence_width` is below the number of digits
    /// the UHID generator requires or above [`MAX_SEQUENCE_WIDTH`].
    pub fn new(data_dir: PathBuf, sequence_width: usize) -> RecordResult<Self> {
        if !(MIN_ID_DIGITS..=MAX_SEQUENCE_WIDTH).contains(&sequence_width) {
            return Err(RecordError::InvalidInput(format!(
                "sequence_width must be between {} and {}, got {}",
                MIN_ID_DIGITS, MAX_SEQUENCE_WIDTH, sequence_width
            )));
        }

        if sequence_width > MIN_ID_DIGITS {
            tracing::warn!(
                sequence_width,
                "sequence numbers wider than {} digits lose their middle digits in the UHID",
                MIN_ID_DIGITS
            );
        }

        Ok(Self {
            data_dir,
            sequence_width,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sequence_width(&self) -> usize {
        self.sequence_width
    }

    /// Directory holding records of the given kind.
    pub fn entity_dir(&self, kind: EntityKind) -> PathBuf {
        self.data_dir.join(kind.dir_name())
    }

    pub fn uhid_index_dir(&self) -> PathBuf {
        self.data_dir.join(UHID_INDEX_DIR_NAME)
    }

    pub fn sequence_file(&self) -> PathBuf {
        self.data_dir.join(SEQUENCE_FILENAME)
    }
}

/// Resolve the data directory from an optional value.
///
/// `None` or an empty/whitespace value yields [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the sequence width from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_SEQUENCE_WIDTH`]. Range checks
/// happen in [`CoreConfig::new`].
pub fn sequence_width_from_env_value(value: Option<String>) -> RecordResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_SEQUENCE_WIDTH),
        Some(v) => v.parse::<usize>().map_err(|e| {
            RecordError::InvalidInput(format!("invalid sequence width '{}': {}", v, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_default_width() {
        let cfg = CoreConfig::new(PathBuf::from("/data"), DEFAULT_SEQUENCE_WIDTH)
            .expect("CoreConfig::new should succeed");
        assert_eq!(cfg.sequence_width(), 6);
        assert_eq!(cfg.data_dir(), Path::new("/data"));
    }

    #[test]
    fn test_new_rejects_width_below_generator_minimum() {
        let err = CoreConfig::new(PathBuf::from("/data"), 5).unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn test_new_rejects_width_above_maximum() {
        let err = CoreConfig::new(PathBuf::from("/data"), MAX_SEQUENCE_WIDTH + 1).unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn test_derived_paths() {
        let cfg = CoreConfig::new(PathBuf::from("/data"), 6).unwrap();
        assert_eq!(
            cfg.entity_dir(EntityKind::Patient),
            PathBuf::from("/data/patients")
        );
        assert_eq!(
            cfg.entity_dir(EntityKind::Doctor),
            PathBuf::from("/data/doctors")
        );
        assert_eq!(cfg.uhid_index_dir(), PathBuf::from("/data/uhid-index"));
        assert_eq!(cfg.sequence_file(), PathBuf::from("/data/sequence.json"));
    }

    #[test]
    fn test_data_dir_from_env_value() {
        assert_eq!(
            data_dir_from_env_value(None),
            PathBuf::from(DEFAULT_DATA_DIR)
        );
        assert_eq!(
            data_dir_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_DATA_DIR)
        );
        assert_eq!(
            data_dir_from_env_value(Some(" /srv/medrec ".into())),
            PathBuf::from("/srv/medrec")
        );
    }

    #[test]
    fn test_sequence_width_from_env_value() {
        assert_eq!(sequence_width_from_env_value(None).unwrap(), 6);
        assert_eq!(sequence_width_from_env_value(Some("".into())).unwrap(), 6);
        assert_eq!(sequence_width_from_env_value(Some(" 9 ".into())).unwrap(), 9);

        let err = sequence_width_from_env_value(Some("six".into())).unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }
}
