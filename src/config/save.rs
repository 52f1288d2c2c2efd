use std::path::Path;

use crate::atomic_file::atomic_write;

use super::load::settings_path;
use super::{AppSettings, ConfigError};

/// Persist settings to the app directory, overwriting previous contents.
pub fn save(settings: &AppSettings) -> Result<(), ConfigError> {
    save_to_path(settings, &settings_path()?)
}

/// Write the TOML settings file atomically, creating parent directories as needed.
pub fn save_to_path(settings: &AppSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, data.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
