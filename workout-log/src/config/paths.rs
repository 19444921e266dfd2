//! Platform-specific path utilities for workout-log.

use std::path::PathBuf;

use crate::error::{Result, StoreError};

/// Directory name used under the platform base directories.
const APP_DIR: &str = "workout-log";

/// Get the configuration directory for workout-log.
///
/// - Linux: `~/.config/workout-log`
/// - macOS: `~/Library/Application Support/workout-log`
/// - Windows: `%APPDATA%\workout-log`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| StoreError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Get the per-user documents directory holding the workout log.
///
/// - Linux: `~/Documents/workout-log` (or `$XDG_DOCUMENTS_DIR`)
/// - macOS: `~/Documents/workout-log`
/// - Windows: `{FOLDERID_Documents}\workout-log`
pub fn documents_dir() -> Result<PathBuf> {
    let base = dirs::document_dir()
        .ok_or_else(|| StoreError::Config("Cannot determine documents directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
