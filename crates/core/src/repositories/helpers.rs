//! Filesystem helpers for the file-backed store.

use crate::constants::TEMP_FILE_SUFFIX;
use crate::{BookingError, BookingResult};
use booking_uuid::RecordId;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Creates the sharded record directory `dir` and its parents. An existing directory is fine.
///
/// # Errors
///
/// Returns `BookingError::StorageDirCreation` if a directory cannot be created.
pub(crate) fn create_record_dir(dir: &Path) -> BookingResult<()> {
    fs::create_dir_all(dir).map_err(BookingError::StorageDirCreation)
}

/// A sibling of `path` that no other writer will pick, e.g. `booking.yaml.<id>.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(format!(".{}{}", RecordId::new(), TEMP_FILE_SUFFIX));
    PathBuf::from(tmp_name)
}

fn remove_temp_file(tmp_path: &Path) {
    if let Err(e) = fs::remove_file(tmp_path) {
        tracing::warn!(
            "failed to remove temporary record file {}: {}",
            tmp_path.display(),
            e
        );
    }
}

/// Writes `content` to `path` through a temporary file and a rename, so readers see
/// either the old record or the new one and never a partial write.
///
/// # Errors
///
/// Returns `BookingError::FileWrite` if writing or renaming fails. The temporary file is removed
/// on a failed rename.
pub(crate) fn write_atomically(path: &Path, content: &str) -> BookingResult<()> {
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, content).map_err(BookingError::FileWrite)?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        remove_temp_file(&tmp_path);
        return Err(BookingError::FileWrite(e));
    }

    Ok(())
}

/// Writes `content` to `path` only if `path` does not exist yet.
///
/// The complete content is written to a temporary file first and then hard-linked into place,
/// so the record file appears fully written or not at all, and of two concurrent writers
/// exactly one wins.
///
/// # Returns
///
/// `Ok(true)` if the record was created, `Ok(false)` if `path` already existed.
///
/// # Errors
///
/// Returns `BookingError::FileWrite` if the temporary file cannot be written or linked.
pub(crate) fn write_new_atomically(path: &Path, content: &str) -> BookingResult<bool> {
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, content).map_err(BookingError::FileWrite)?;

    let linked = fs::hard_link(&tmp_path, path);
    remove_temp_file(&tmp_path);

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(BookingError::FileWrite(e)),
    }
}

/// Lists every `<kind_dir>/<s1>/<s2>/<id>/<file_name>` that exists as a regular file.
///
/// A missing `kind_dir` yields an empty list. Stray files at the shard levels are ignored.
///
/// # Errors
///
/// Returns `BookingError::FileRead` if a shard directory exists but cannot be listed.
pub(crate) fn collect_record_files(kind_dir: &Path, file_name: &str) -> BookingResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    let s1_iter = match fs::read_dir(kind_dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(BookingError::FileRead(e)),
    };

    for s1 in s1_iter {
        let s1_path = s1.map_err(BookingError::FileRead)?.path();
        if !s1_path.is_dir() {
            continue;
        }

        for s2 in fs::read_dir(&s1_path).map_err(BookingError::FileRead)? {
            let s2_path = s2.map_err(BookingError::FileRead)?.path();
            if !s2_path.is_dir() {
                continue;
            }

            for id_ent in fs::read_dir(&s2_path).map_err(BookingError::FileRead)? {
                let record_path = id_ent.map_err(BookingError::FileRead)?.path().join(file_name);
                if record_path.is_file() {
                    files.push(record_path);
                }
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_record_dir_accepts_existing_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("ab").join("cd").join("abcd");

        create_record_dir(&dir).expect("first create should succeed");
        assert!(dir.is_dir());
        create_record_dir(&dir).expect("second create should succeed");
    }

    #[test]
    fn test_write_new_atomically_never_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("booking.yaml");

        assert!(write_new_atomically(&path, "first").expect("first write should succeed"));
        assert!(!write_new_atomically(&path, "second").expect("second write should succeed"));
        assert_eq!(fs::read_to_string(&path).expect("should read"), "first");

        let entries = fs::read_dir(temp_dir.path()).expect("should list").count();
        assert_eq!(entries, 1, "no temporary files should remain");
    }

    #[test]
    fn test_write_atomically_replaces_content_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("booking.yaml");

        write_atomically(&path, "first").expect("write should succeed");
        write_atomically(&path, "second").expect("overwrite should succeed");

        assert_eq!(fs::read_to_string(&path).expect("should read"), "second");
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("should list")
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(TEMP_FILE_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "no temporary files should remain");
    }

    #[test]
    fn test_collect_record_files_walks_shards() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let kind_dir = temp_dir.path().join("bookings");

        assert!(collect_record_files(&kind_dir, "booking.yaml")
            .expect("missing dir should be empty")
            .is_empty());

        for id in ["aa11", "aa22", "bb33"] {
            let dir = kind_dir.join(&id[0..2]).join(&id[2..4]).join(id);
            fs::create_dir_all(&dir).expect("should create dir");
            fs::write(dir.join("booking.yaml"), "x").expect("should write");
        }
        // A record directory without its file and a stray top-level file are skipped.
        fs::create_dir_all(kind_dir.join("cc").join("44").join("cc44")).expect("should create");
        fs::write(kind_dir.join("README"), "stray").expect("should write");

        let files = collect_record_files(&kind_dir, "booking.yaml").expect("should collect");
        assert_eq!(files.len(), 3);
    }
}
