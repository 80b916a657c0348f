//! Settings persistence.
//!
//! The controller depends on the [`SettingsStore`] trait, injected at
//! construction; [`TomlSettingsStore`] is the file-backed implementation
//! used by real front-ends. Load is always "or default": a missing or
//! unreadable record is a recoverable condition, never a hard failure.

mod store;

pub use store::{SettingsStore, TomlSettingsStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomoflow[-dev]/` based on POMOFLOW_ENV.
///
/// Set POMOFLOW_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomoflow-dev")
    } else {
        base_dir.join("pomoflow")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDirFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
