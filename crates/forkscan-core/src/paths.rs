//! Output directory handling for the file transport.
//!
//! Result files are named deterministically by partition index so the
//! coordinator can find, read, and delete them without any listing.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur while preparing the output directory.
#[derive(Debug, Error)]
pub enum PathError {
    /// A path was expected to be a directory but was not.
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// A directory is not writable.
    #[error("Directory {path} is not writable: {reason}")]
    NotWritable { path: PathBuf, reason: String },
}

/// File name a worker uses to report the result of partition `index`.
pub fn result_file_name(index: usize) -> String {
    format!("min_max_{index}.txt")
}

/// Full path of the result file for partition `index` under `dir`.
pub fn result_file_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(result_file_name(index))
}

/// Temporary path a worker writes to before renaming into place.
pub fn result_temp_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.tmp", result_file_name(index)))
}

/// Ensure the output directory exists (creating it if needed) and is writable.
pub fn ensure_output_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    verify_writable(path)
}

/// Verify a directory is writable by creating and removing a marker file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let marker = path.join(".forkscan_write_test");
    let result = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&marker)
        .and_then(|mut file| file.write_all(b"ok"));

    match result {
        Ok(()) => {
            if let Err(e) = fs::remove_file(&marker) {
                debug!(path = %marker.display(), error = %e, "Failed to remove write-test file");
            }
            Ok(())
        }
        Err(e) => Err(PathError::NotWritable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_result_files_are_named_by_index() {
        assert_eq!(result_file_name(0), "min_max_0.txt");
        assert_eq!(
            result_file_path(Path::new("/tmp/run"), 7),
            PathBuf::from("/tmp/run/min_max_7.txt")
        );
        assert_eq!(
            result_temp_path(Path::new("out"), 2),
            PathBuf::from("out/min_max_2.txt.tmp")
        );
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("a/b");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(".forkscan_write_test").exists());
    }

    #[test]
    fn test_writable_check_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        verify_writable(dir.path()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_regular_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_output_dir(&file),
            Err(PathError::NotADirectory(_))
        ));
    }
}
