//! Filesystem utilities shared by the record repositories.

use crate::record_id::RecordId;
use crate::{RecordError, RecordResult};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Creates a fresh sharded record directory under `base_dir`.
///
/// Ids come from `id_source`; an id whose directory already exists (a collision, or a
/// directory left behind by external interference) is skipped, up to five attempts.
///
/// # Errors
///
/// Returns [`RecordError::RecordDirCreation`] if a parent directory cannot be created or no
/// free directory was found after five attempts.
pub(crate) fn create_unique_record_dir(
    base_dir: &Path,
    mut id_source: impl FnMut() -> RecordId,
) -> RecordResult<(RecordId, PathBuf)> {
    for _attempt in 0..5 {
        let id = id_source();
        let candidate = id.sharded_dir(base_dir);

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(RecordError::RecordDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((id, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(RecordError::RecordDirCreation(e)),
        }
    }

    Err(RecordError::RecordDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique record directory after 5 attempts",
    )))
}

/// Replaces `path` with `contents` via a sibling temporary file and a rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> RecordResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    fs::write(&tmp, contents).map_err(RecordError::FileWrite)?;
    fs::rename(&tmp, path).map_err(RecordError::FileWrite)
}

/// Returns every `<base_dir>/<s1>/<s2>/<id>/` directory, skipping anything unreadable.
///
/// A missing `base_dir` yields an empty list; any other unreadable directory is logged.
pub(crate) fn sharded_leaf_dirs(base_dir: &Path) -> Vec<PathBuf> {
    fn subdirs(path: &Path) -> Vec<PathBuf> {
        match fs::read_dir(path) {
            Ok(it) => it
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("failed to read directory {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    subdirs(base_dir)
        .iter()
        .flat_map(|s1| subdirs(s1))
        .flat_map(|s2| subdirs(&s2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_unique_record_dir_creates_sharded_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (id, dir) = create_unique_record_dir(temp_dir.path(), RecordId::new)
            .expect("allocation should succeed");

        assert!(dir.is_dir());
        assert_eq!(dir, id.sharded_dir(temp_dir.path()));
    }

    #[test]
    fn test_create_unique_record_dir_skips_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let taken = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let free = RecordId::parse("660e8400e29b41d4a716446655440000").unwrap();
        fs::create_dir_all(taken.sharded_dir(temp_dir.path())).unwrap();

        let mut ids = vec![free, taken];
        let (id, _) = create_unique_record_dir(temp_dir.path(), || ids.pop().unwrap())
            .expect("allocation should succeed");

        assert_eq!(id, free);
    }

    #[test]
    fn test_create_unique_record_dir_gives_up_after_five_attempts() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let taken = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        fs::create_dir_all(taken.sharded_dir(temp_dir.path())).unwrap();

        let err = create_unique_record_dir(temp_dir.path(), || taken).unwrap_err();
        assert!(matches!(err, RecordError::RecordDirCreation(_)));
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("record.yaml");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("record.yaml.tmp").exists());
    }

    #[test]
    fn test_sharded_leaf_dirs_ignores_files_and_missing_base() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert!(sharded_leaf_dirs(&temp_dir.path().join("missing")).is_empty());

        let id = RecordId::new();
        fs::create_dir_all(id.sharded_dir(temp_dir.path())).unwrap();
        fs::write(temp_dir.path().join("stray.txt"), "x").unwrap();

        let leaves = sharded_leaf_dirs(temp_dir.path());
        assert_eq!(leaves, vec![id.sharded_dir(temp_dir.path())]);
    }

    #[test]
    fn test_sharded_leaf_dirs_treats_file_base_as_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let not_a_dir = temp_dir.path().join("patients");
        fs::write(&not_a_dir, "x").unwrap();

        assert!(sharded_leaf_dirs(&not_a_dir).is_empty());
    }
}
