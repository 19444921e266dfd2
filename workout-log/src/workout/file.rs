//! Backing file for the workout log.
//!
//! - [`LogFile`] - Trait for the file operations the store needs (enables mocking)
//! - [`JsonLogFile`] - JSON array on disk, replaced atomically on every write

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::DEFAULT_LOG_FILE_NAME;
use crate::error::{Result, StoreError};
use crate::workout::types::LoggedWorkout;

/// Trait for workout log file operations (enables mocking in tests).
#[cfg_attr(test, mockall::automock)]
pub trait LogFile: Send + Sync {
    /// Location of the file.
    fn path(&self) -> PathBuf;

    /// Reads every workout in the file.
    ///
    /// Returns `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file cannot be read and
    /// [`StoreError::Decode`] if it is not a valid workout array.
    fn read(&self) -> Result<Option<Vec<LoggedWorkout>>>;

    /// Replaces the file contents with `workouts`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] or [`StoreError::Write`]. The previous
    /// file is left untouched on failure.
    fn write(&self, workouts: &[LoggedWorkout]) -> Result<()>;

    /// Deletes the file.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Delete`] if removal fails.
    fn remove(&self) -> Result<bool>;
}

/// JSON file-based log implementation.
#[derive(Debug, Clone)]
pub struct JsonLogFile {
    path: PathBuf,
}

impl JsonLogFile {
    /// Log file with the default versioned name inside `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::at(dir.as_ref().join(DEFAULT_LOG_FILE_NAME))
    }

    /// Log file at an explicit path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_error(&self, message: impl ToString) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    /// Directory temp files are created in. Must share a filesystem with the
    /// target for the rename to be atomic.
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl LogFile for JsonLogFile {
    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn read(&self) -> Result<Option<Vec<LoggedWorkout>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let workouts = serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        Ok(Some(workouts))
    }

    fn write(&self, workouts: &[LoggedWorkout]) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(workouts).map_err(|e| StoreError::Encode(e.to_string()))?;

        let parent = self.parent_dir();
        fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;

        // Atomic write: temp file in the same directory, then rename over the target
        let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| self.write_error(e))?;
        temp_file.write_all(&json).map_err(|e| self.write_error(e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| self.write_error(e))?;
        protect(temp_file.as_file()).map_err(|e| self.write_error(e))?;

        temp_file
            .persist(&self.path)
            .map_err(|e| self.write_error(format!("failed to replace file: {}", e.error)))?;

        Ok(())
    }

    fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Restricts the file to its owner.
#[cfg(unix)]
fn protect(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn protect(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
