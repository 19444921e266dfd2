//! Error types and result aliases for workout-log.
//!
//! The store itself never hands these to callers of its mutation or load
//! operations. They travel to observers inside [`StoreEvent`]s and are
//! returned only from constructors, configuration loading and the CLI.
//!
//! [`StoreEvent`]: crate::workout::StoreEvent

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for workout-log operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The log file exists but could not be read.
    #[error("Failed to read workout log at {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The log file contents are not a valid workout array.
    #[error("Workout log at {path} is corrupted: {message}")]
    Decode {
        /// File that failed to decode.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// The in-memory workouts could not be encoded.
    #[error("Failed to encode workouts: {0}")]
    Encode(String),

    /// Writing or replacing the log file failed.
    #[error("Failed to write workout log at {path}: {message}. Check directory permissions.")]
    Write {
        /// Destination file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Removing the log file failed.
    #[error("Failed to delete workout log at {path}: {source}")]
    Delete {
        /// File that could not be removed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The background writer is gone (runtime shut down).
    #[error("Workout log writer is not running")]
    WriterStopped,

    /// The store was created outside a Tokio runtime.
    #[error("Workout log store needs a Tokio runtime to run its writer")]
    NoRuntime,

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// No workout with the given identifier.
    #[error("Workout '{0}' not found. Run 'wlog list' to see logged workouts.")]
    NotFound(String),

    /// Input supplied on the command line is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Checks if the error came from an unreadable or corrupted log file.
    ///
    /// Both cases are absorbed by `load` as an empty workout history.
    #[must_use]
    pub const fn is_load_failure(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Decode { .. })
    }

    /// Checks if the error came from the write path.
    #[must_use]
    pub const fn is_persist_failure(&self) -> bool {
        matches!(self, Self::Encode(_) | Self::Write { .. } | Self::WriterStopped)
    }

    /// Checks if this is a "not found" error reported to CLI users.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigRead(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_file() {
        let err = StoreError::Decode {
            path: PathBuf::from("/docs/logged_workouts_v1.json"),
            message: "expected value at line 1 column 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("logged_workouts_v1.json"));
        assert!(msg.contains("corrupted"));
    }

    #[test]
    fn classifies_load_failures() {
        let read = StoreError::Read {
            path: PathBuf::from("/x"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(read.is_load_failure());
        assert!(StoreError::Decode {
            path: PathBuf::from("/x"),
            message: String::new()
        }
        .is_load_failure());

        assert!(!StoreError::Encode("boom".to_string()).is_load_failure());
        assert!(!StoreError::NotFound("abc".to_string()).is_load_failure());
    }

    #[test]
    fn classifies_persist_failures() {
        assert!(StoreError::Encode("boom".to_string()).is_persist_failure());
        assert!(StoreError::WriterStopped.is_persist_failure());
        assert!(StoreError::Write {
            path: PathBuf::from("/x"),
            message: "disk full".to_string()
        }
        .is_persist_failure());

        assert!(!StoreError::Config("x".to_string()).is_persist_failure());
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = StoreError::NotFound("1234".to_string());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("wlog list"));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: StoreError = toml_err.into();
        assert!(matches!(err, StoreError::ConfigRead(_)));
    }
}
