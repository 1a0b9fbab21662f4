//! Sequence number allocation.
//!
//! UHIDs are derived from a numeric identifier that the caller must keep unique. This module
//! provides that identifier: a monotonically increasing counter persisted as
//! `<data_dir>/sequence.json` and handed out zero-padded to the configured width.
//!
//! Allocation within a process is serialised by a mutex. The counter file is replaced through
//! a temporary file and a rename, so readers only ever see a complete value. Concurrent
//! processes are not coordinated here; the registry's UHID index rejects any duplicate that
//! such a race would produce.

use crate::config::CoreConfig;
use crate::constants::FIRST_SEQUENCE;
use crate::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Serialize, Deserialize)]
struct SequenceState {
    next: u64,
}

/// A sequence value paired with the width it is padded to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceNumber {
    value: u64,
    width: usize,
}

impl SequenceNumber {
    /// Pairs `value` with `width`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::SequenceExhausted`] if `value` needs more than `width` digits.
    pub fn new(value: u64, width: usize) -> RecordResult<Self> {
        let limit = u32::try_from(width)
            .ok()
            .and_then(|w| 10u64.checked_pow(w))
            .ok_or(RecordError::SequenceExhausted { width })?;
        if value >= limit {
            return Err(RecordError::SequenceExhausted { width });
        }
        Ok(Self { value, width })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.value, width = self.width)
    }
}

/// Hands out sequence numbers backed by the counter file.
#[derive(Debug)]
pub struct SequenceAllocator {
    path: PathBuf,
    width: usize,
    lock: Mutex<()>,
}

impl SequenceAllocator {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            path: cfg.sequence_file(),
            width: cfg.sequence_width(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the value the next call to [`allocate`](Self::allocate) would hand out.
    pub fn peek(&self) -> RecordResult<u64> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RecordError::SequenceLockPoisoned)?;
        self.read_next()
    }

    /// Allocates the next sequence number and advances the persisted counter.
    ///
    /// The counter is only advanced once the value is known to fit the configured width, so an
    /// exhausted sequence stays exhausted rather than skipping ahead.
    ///
    /// # Errors
    ///
    /// - [`RecordError::SequenceExhausted`] if the next value does not fit the width.
    /// - I/O and (de)serialisation errors from reading or writing the counter file.
    pub fn allocate(&self) -> RecordResult<SequenceNumber> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RecordError::SequenceLockPoisoned)?;

        let next = self.read_next()?;
        let number = SequenceNumber::new(next, self.width)?;
        self.write_next(next + 1)?;

        tracing::debug!(sequence = %number, "allocated sequence number");
        Ok(number)
    }

    fn read_next(&self) -> RecordResult<u64> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let state: SequenceState =
                    serde_json::from_str(&contents).map_err(RecordError::Deserialization)?;
                Ok(state.next)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FIRST_SEQUENCE),
            Err(e) => Err(RecordError::FileRead(e)),
        }
    }

    fn write_next(&self, next: u64) -> RecordResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(RecordError::StorageDirCreation)?;
        }

        let json = serde_json::to_string_pretty(&SequenceState { next })
            .map_err(RecordError::Serialization)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(RecordError::FileWrite)?;
        fs::rename(&tmp, &self.path).map_err(RecordError::FileWrite)
    }
}
