//! Constants used throughout the MedRec core crate.
//!
//! Path and filename constants live here so the on-disk layout is defined in one place.

/// Default directory for record storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "medrec_data";

/// Directory name for patient records.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Directory name for doctor records.
pub const DOCTORS_DIR_NAME: &str = "doctors";

/// Directory name for the UHID index, shared by all entity kinds.
pub const UHID_INDEX_DIR_NAME: &str = "uhid-index";

/// Filename for an entity record.
pub const RECORD_FILENAME: &str = "record.yaml";

/// Filename for the persisted sequence counter.
pub const SEQUENCE_FILENAME: &str = "sequence.json";

/// Default zero-padded width of sequence numbers.
///
/// Six digits is the only width where every digit reaches the UHID (three head, three tail).
pub const DEFAULT_SEQUENCE_WIDTH: usize = 6;

/// Widest sequence number accepted; keeps `10^width` within `u64`.
pub const MAX_SEQUENCE_WIDTH: usize = 12;

/// First value handed out by a fresh sequence.
pub const FIRST_SEQUENCE: u64 = 1;
