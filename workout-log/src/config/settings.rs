//! Application configuration settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::paths::documents_dir;
use crate::error::{Result, StoreError};

/// File name of the workout log. The `_v1` suffix is the schema version.
pub const DEFAULT_LOG_FILE_NAME: &str = "logged_workouts_v1.json";

/// Main configuration for workout-log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutLogConfig {
    /// Where the workout log is stored.
    pub storage: StorageConfig,
}

/// Storage location settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the log file. Defaults to the documents directory.
    pub data_dir: Option<PathBuf>,
    /// Name of the log file inside `data_dir`.
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            file_name: DEFAULT_LOG_FILE_NAME.to_string(),
        }
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const DATA_DIR: &str = "WLOG_DATA_DIR";
    pub const LOG_LEVEL: &str = "WLOG_LOG";
}

impl WorkoutLogConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(env::DATA_DIR).filter(|d| !d.trim().is_empty()) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Directory the log file lives in.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => documents_dir(),
        }
    }

    /// Full path of the workout log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file name is empty or contains path
    /// separators, or if no data directory can be determined.
    pub fn log_path(&self) -> Result<PathBuf> {
        let name = &self.storage.file_name;

        if name.is_empty() {
            return Err(StoreError::Config(
                "storage.file_name cannot be empty".to_string(),
            ));
        }

        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(StoreError::Config(format!(
                "storage.file_name '{name}' cannot contain path separators"
            )));
        }

        Ok(self.data_dir()?.join(name))
    }
}
