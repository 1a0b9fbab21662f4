use medrec_types::TextError;
use medrec_uhid::{Uhid, UhidError};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid UHID input: {0}")]
    Uhid(#[from] UhidError),
    #[error("invalid display name: {0}")]
    Text(#[from] TextError),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create record directory: {0}")]
    RecordDirCreation(std::io::Error),
    #[error(
        "register failed and cleanup also failed (path: {path}): register={register_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterRegisterFailed {
        path: std::path::PathBuf,
        #[source]
        register_error: Box<RecordError>,
        cleanup_error: std::io::Error,
    },
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize sequence state: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize sequence state: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),

    #[error("sequence exhausted: next value does not fit in {width} digits")]
    SequenceExhausted { width: usize },
    #[error("sequence lock poisoned")]
    SequenceLockPoisoned,
    #[error("record update lock poisoned")]
    RecordLockPoisoned,

    #[error("UHID {0} is already assigned to another record")]
    DuplicateUhid(Uhid),
    #[error("no record with UHID {0}")]
    NotFound(Uhid),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
