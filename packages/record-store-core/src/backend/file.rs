//! Directory-backed store: one file per key.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::io_utils::{classify_io_error, retry_io_operation};
use super::KvBackend;

const FILE_EXTENSION: &str = "db";

/// Stores each key as `<data_dir>/<key>.db`.
///
/// Writes go to a temporary file that is synced and then renamed over the
/// target, so a reader sees either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileBackend {
    data_dir: PathBuf,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl FileBackend {
    /// Creates a backend rooted at `data_dir`. The directory is created on the
    /// first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }

    /// Overrides the transient I/O retry policy.
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;

        let temp_path = path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        let mut file = File::create(&temp_path)
            .map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
        file.write_all(value.as_bytes())
            .map_err(|e| classify_io_error(e, "Failed to write snapshot"))?;
        file.sync_all()
            .map_err(|e| classify_io_error(e, "Failed to sync snapshot"))?;

        fs::rename(&temp_path, path)
            .map_err(|e| classify_io_error(e, "Failed to rename snapshot file"))
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        retry_io_operation(
            || match fs::read_to_string(&path) {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) if e.kind() == ErrorKind::InvalidData => Err(StoreError::CorruptData(
                    format!("{} is not valid UTF-8", path.display()),
                )),
                Err(e) => Err(classify_io_error(e, "Failed to read snapshot")),
            },
            self.max_retries,
            self.retry_delay_ms,
            "file backend get",
        )
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        retry_io_operation(
            || self.write_atomic(&path, value),
            self.max_retries,
            self.retry_delay_ms,
            "file backend set",
        )
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        retry_io_operation(
            || match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(classify_io_error(e, "Failed to remove snapshot")),
            },
            self.max_retries,
            self.retry_delay_ms,
            "file backend remove",
        )
    }
}

/// Keys become file names, so they must stay inside the data directory.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
        || key.trim() != key;
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
