//! Configuration management for workout-log.

pub mod paths;
pub mod settings;

pub use paths::config_file;
pub use settings::{StorageConfig, WorkoutLogConfig, DEFAULT_LOG_FILE_NAME};

use std::path::Path;

use crate::error::Result;

/// Load configuration from the default config file.
///
/// If the config file doesn't exist, returns default configuration.
pub fn load_config() -> Result<WorkoutLogConfig> {
    let path = config_file()?;
    load_config_from(&path)
}

/// Load configuration from a specific path.
///
/// If the file doesn't exist, returns default configuration.
pub fn load_config_from(path: &Path) -> Result<WorkoutLogConfig> {
    if !path.exists() {
        return Ok(WorkoutLogConfig::default().with_env_overrides());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: WorkoutLogConfig = toml::from_str(&contents)?;

    Ok(config.with_env_overrides())
}
