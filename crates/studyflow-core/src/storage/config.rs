//! TOML-based application configuration.
//!
//! Stores the active user id and an optional database path override.
//! Configuration lives at `~/.config/studyflow/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigurationError;

fn default_user() -> String {
    "default".to_string()
}

/// Application configuration.
///
/// Serialized to/from TOML at `data_dir()/config.toml`. Unknown or missing
/// fields fall back to their defaults, so old config files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// User id every CLI command is scoped to
    #[serde(default = "default_user")]
    pub user: String,
    /// Explicit database file path; defaults to `data_dir()/studyflow.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: default_user(),
            database_path: None,
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigurationError> {
        let dir = data_dir().map_err(|e| ConfigurationError::LoadFailed {
            path: PathBuf::from("~/.config/studyflow"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load the config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigurationError> {
        let path = Self::path()?;
        let contents =
            std::fs::read_to_string(&path).map_err(|e| ConfigurationError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        toml::from_str(&contents).map_err(|e| ConfigurationError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Save the config file.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigurationError> {
        let path = Self::path()?;
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigurationError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, contents).map_err(|e| ConfigurationError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}
