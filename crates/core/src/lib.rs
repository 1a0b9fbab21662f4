//! # MedRec Core
//!
//! Record-keeping around UHID assignment:
//! - Runtime configuration resolved once at startup ([`CoreConfig`])
//! - Sequence number allocation feeding the UHID generator ([`SequenceAllocator`])
//! - Patient and doctor registration, lookup by UHID and renaming ([`RegistryService`])
//!
//! Records are stored as YAML under sharded directories of the configured data directory.
//!
//! **No presentation concerns**: argument parsing, output formatting and logging setup belong
//! in the `medrec` binary.

pub mod config;
pub mod constants;
pub mod entity;
pub mod error;
pub mod record_id;
pub mod repositories;
pub mod sequence;

pub use config::CoreConfig;
pub use entity::{EntityKind, RegisteredEntity};
pub use error::{RecordError, RecordResult};
pub use record_id::RecordId;
pub use repositories::registry::RegistryService;
pub use sequence::{SequenceAllocator, SequenceNumber};

pub use medrec_types::{DisplayName, TextError};
pub use medrec_uhid::{Uhid, UhidError, UhidGenerator};
