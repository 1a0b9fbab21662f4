//! Patient and doctor registration.
//!
//! This is the entity-creation workflow that feeds the UHID generator: it allocates a
//! sequence number, derives the UHID from the display name and that number, and persists the
//! result. The UHID is written once and never recomputed; renaming an entity leaves it as is.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//!   sequence.json                 # next sequence value
//!   patients/<s1>/<s2>/<id>/record.yaml
//!   doctors/<s1>/<s2>/<id>/record.yaml
//!   uhid-index/<L1L2>/<UHID>.yaml # kind + record id, claimed exclusively
//! ```
//!
//! The index entry is created exclusively, so two records can never end up sharing a UHID even
//! when the generator would produce one twice. The second registration fails with
//! [`RecordError::DuplicateUhid`] instead.

use crate::config::CoreConfig;
use crate::constants::RECORD_FILENAME;
use crate::entity::{EntityKind, RegisteredEntity};
use crate::record_id::RecordId;
use crate::repositories::helpers::{create_unique_record_dir, sharded_leaf_dirs, write_atomic};
use crate::sequence::SequenceAllocator;
use crate::{RecordError, RecordResult};
use chrono::Utc;
use medrec_types::DisplayName;
use medrec_uhid::{Uhid, UhidGenerator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[cfg(test)]
use std::collections::HashSet;
#[cfg(test)]
use std::sync::LazyLock;

#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    kind: EntityKind,
    record_id: RecordId,
}

/// Registers entities and looks them up by UHID.
///
/// Cloning is cheap and clones share one [`SequenceAllocator`] and one update lock, so
/// allocation and record updates stay serialised across every clone in the process.
#[derive(Clone, Debug)]
pub struct RegistryService {
    cfg: Arc<CoreConfig>,
    sequence: Arc<SequenceAllocator>,
    update_lock: Arc<Mutex<()>>,
}

impl RegistryService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let sequence = Arc::new(SequenceAllocator::new(&cfg));
        Self {
            cfg,
            sequence,
            update_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Registers a new entity and assigns its UHID.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if:
    /// - `display_name` is not a valid display name ([`RecordError::Text`]),
    /// - the sequence is exhausted or its counter cannot be read or written,
    /// - the generator rejects its inputs ([`RecordError::Uhid`]),
    /// - the UHID is already assigned ([`RecordError::DuplicateUhid`]),
    /// - the record cannot be written, or cleanup of a partial record fails
    ///   ([`RecordError::CleanupAfterRegisterFailed`]).
    pub fn register(&self, kind: EntityKind, display_name: &str) -> RecordResult<RegisteredEntity> {
        let display_name = DisplayName::new(display_name)?;
        let sequence = self.sequence.allocate()?;
        let uhid = UhidGenerator::generate(display_name.as_str(), &sequence.to_string())?;

        let entity_dir = self.cfg.entity_dir(kind);
        let (record_id, record_dir) = create_unique_record_dir(&entity_dir, RecordId::new)?;

        let entity = RegisteredEntity {
            record_id,
            uhid,
            kind,
            display_name,
            sequence: sequence.value(),
            created_at: Utc::now(),
            updated_at: None,
        };

        if let Err(register_error) = self.persist_new(&record_dir, &entity) {
            if let Err(cleanup_error) = cleanup_record_dir(&record_dir) {
                return Err(RecordError::CleanupAfterRegisterFailed {
                    path: record_dir,
                    register_error: Box::new(register_error),
                    cleanup_error,
                });
            }
            return Err(register_error);
        }

        tracing::info!(
            kind = %entity.kind,
            uhid = %entity.uhid,
            record_id = %entity.record_id,
            "registered entity"
        );
        Ok(entity)
    }

    /// Looks up the entity that owns `uhid`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if no index entry exists for `uhid`, or a read or
    /// parse error if the index entry or record is damaged.
    pub fn find(&self, uhid: &Uhid) -> RecordResult<RegisteredEntity> {
        let index_path = self.index_path(uhid);
        let raw = match fs::read_to_string(&index_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RecordError::NotFound(uhid.clone()))
            }
            Err(e) => return Err(RecordError::FileRead(e)),
        };
        let entry: IndexEntry =
            serde_yaml::from_str(&raw).map_err(RecordError::YamlDeserialization)?;

        let record_path = self.record_path(entry.kind, &entry.record_id);
        let contents = fs::read_to_string(&record_path).map_err(RecordError::FileRead)?;
        let entity = RegisteredEntity::parse(&contents)?;

        if entity.uhid != *uhid {
            return Err(RecordError::InvalidInput(format!(
                "index entry for {} points at record {} which holds UHID {}",
                uhid, entity.record_id, entity.uhid
            )));
        }

        Ok(entity)
    }

    /// Lists registered entities, optionally restricted to one kind, ordered by sequence.
    ///
    /// Records that cannot be read or parsed are logged and skipped.
    pub fn list(&self, kind: Option<EntityKind>) -> Vec<RegisteredEntity> {
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => EntityKind::ALL.to_vec(),
        };

        let mut entities: Vec<RegisteredEntity> = kinds
            .into_iter()
            .flat_map(|kind| sharded_leaf_dirs(&self.cfg.entity_dir(kind)))
            .filter_map(|dir| read_record(&dir.join(RECORD_FILENAME)))
            .collect();

        entities.sort_by_key(|e| e.sequence);
        entities
    }

    /// Changes the display name of the entity that owns `uhid`.
    ///
    /// The UHID itself is left untouched even though it was derived from the old name.
    /// Updates are serialised within the process; between processes the last write wins.
    pub fn rename(&self, uhid: &Uhid, new_name: &str) -> RecordResult<RegisteredEntity> {
        let display_name = DisplayName::new(new_name)?;

        let _guard = self
            .update_lock
            .lock()
            .map_err(|_| RecordError::RecordLockPoisoned)?;

        let mut entity = self.find(uhid)?;
        entity.display_name = display_name;
        entity.updated_at = Some(Utc::now());

        let record_path = self.record_path(entity.kind, &entity.record_id);
        write_atomic(&record_path, &entity.render()?)?;

        tracing::info!(uhid = %entity.uhid, "renamed entity");
        Ok(entity)
    }

    fn persist_new(&self, record_dir: &Path, entity: &RegisteredEntity) -> RecordResult<()> {
        let index_path = self.index_path(&entity.uhid);
        claim_index_entry(&index_path, entity)?;

        let written = entity
            .render()
            .and_then(|yaml| write_record_file(&record_dir.join(RECORD_FILENAME), &yaml));

        if let Err(e) = written {
            if let Err(release_error) = fs::remove_file(&index_path) {
                tracing::warn!(
                    "failed to release UHID index entry {}: {}",
                    index_path.display(),
                    release_error
                );
            }
            return Err(e);
        }

        Ok(())
    }

    fn index_path(&self, uhid: &Uhid) -> PathBuf {
        uhid.sharded_dir(&self.cfg.uhid_index_dir())
            .with_extension("yaml")
    }

    fn record_path(&self, kind: EntityKind, record_id: &RecordId) -> PathBuf {
        record_id
            .sharded_dir(&self.cfg.entity_dir(kind))
            .join(RECORD_FILENAME)
    }
}

/// Claims `index_path` for `entity`.
///
/// The entry is written in full to a staging file named after the record id, then
/// hard-linked into place. The link either publishes a complete entry or fails with
/// `AlreadyExists`, so an interrupted claim can only leave a stray staging file behind,
/// never a truncated index entry.
fn claim_index_entry(index_path: &Path, entity: &RegisteredEntity) -> RecordResult<()> {
    if let Some(parent) = index_path.parent() {
        fs::create_dir_all(parent).map_err(RecordError::StorageDirCreation)?;
    }

    let yaml = serde_yaml::to_string(&IndexEntry {
        kind: entity.kind,
        record_id: entity.record_id,
    })
    .map_err(RecordError::YamlSerialization)?;

    let mut staged_name = index_path.as_os_str().to_owned();
    staged_name.push(format!(".{}.tmp", entity.record_id));
    let staged = PathBuf::from(staged_name);

    if let Err(e) = fs::write(&staged, yaml) {
        discard_staged_entry(&staged);
        return Err(RecordError::FileWrite(e));
    }

    let linked = fs::hard_link(&staged, index_path);
    discard_staged_entry(&staged);

    match linked {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(RecordError::DuplicateUhid(entity.uhid.clone()))
        }
        Err(e) => Err(RecordError::FileWrite(e)),
    }
}

fn discard_staged_entry(staged: &Path) {
    match fs::remove_file(staged) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "failed to remove staged UHID index entry {}: {}",
            staged.display(),
            e
        ),
    }
}

#[cfg(test)]
static FORCE_RECORD_WRITE_ERROR_FOR_THREADS: LazyLock<Mutex<HashSet<std::thread::ThreadId>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

#[cfg(test)]
static FORCE_CLEANUP_ERROR_FOR_THREADS: LazyLock<Mutex<HashSet<std::thread::ThreadId>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

#[cfg(test)]
fn force_error_for_current_thread(hook: &Mutex<HashSet<std::thread::ThreadId>>) {
    let mut guard = hook.lock().expect("test hook mutex poisoned");
    guard.insert(std::thread::current().id());
}

#[cfg(test)]
fn take_forced_error(hook: &Mutex<HashSet<std::thread::ThreadId>>) -> bool {
    let mut guard = hook.lock().expect("test hook mutex poisoned");
    guard.remove(&std::thread::current().id())
}

/// Writes a new `record.yaml`.
///
/// In test builds a failure can be forced for the current thread.
fn write_record_file(path: &Path, yaml: &str) -> RecordResult<()> {
    #[cfg(test)]
    {
        if take_forced_error(&FORCE_RECORD_WRITE_ERROR_FOR_THREADS) {
            return Err(RecordError::FileWrite(io::Error::other(
                "forced record write failure (test hook)",
            )));
        }
    }

    write_atomic(path, yaml)
}

/// Removes a partially registered record directory.
///
/// In test builds a failure can be forced for the current thread.
fn cleanup_record_dir(record_dir: &Path) -> io::Result<()> {
    #[cfg(test)]
    {
        if take_forced_error(&FORCE_CLEANUP_ERROR_FOR_THREADS) {
            return Err(io::Error::other("forced cleanup failure (test hook)"));
        }
    }

    fs::remove_dir_all(record_dir)
}

fn read_record(path: &Path) -> Option<RegisteredEntity> {
    if !path.is_file() {
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match RegisteredEntity::parse(&contents) {
        Ok(entity) => Some(entity),
        Err(e) => {
            tracing::warn!("failed to parse {}: {}", path.display(), e);
            None
        }
    }
}
