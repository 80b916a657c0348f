//! TOML-backed settings storage.
//!
//! The persisted record is exactly [`TimerSettings`], written to
//! `config.toml` under the app data directory on every mutation and read
//! once at startup.

use std::path::PathBuf;

use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::TimerSettings;

/// Repository the controller writes settings through.
pub trait SettingsStore: Send {
    /// Load persisted settings, substituting defaults when the record is
    /// absent, unreadable, or invalid.
    fn load(&self) -> TimerSettings;

    /// Write settings through to the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    fn save(&self, settings: &TimerSettings) -> Result<(), ConfigError>;
}

/// File-backed [`SettingsStore`] serializing to TOML.
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    /// Store at the standard location: `config.toml` under [`data_dir`].
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::at(data_dir()?.join("config.toml")))
    }

    /// Store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> TimerSettings {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return TimerSettings::default(),
        };
        let settings = match toml::from_str::<TimerSettings>(&content) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "persisted settings unreadable, using defaults");
                return TimerSettings::default();
            }
        };
        if let Err(err) = settings.validate() {
            warn!(path = %self.path.display(), %err, "persisted settings invalid, using defaults");
            return TimerSettings::default();
        }
        settings
    }

    fn save(&self, settings: &TimerSettings) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(settings).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
