use std::path::{Path, PathBuf};

use crate::app_dirs;

use super::{AppSettings, ConfigError, SETTINGS_FILE_NAME, map_app_dir_error};

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(SETTINGS_FILE_NAME))
}

/// Load settings from the app directory, returning defaults if missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_from(&settings_path()?)
}

/// Load settings from `path`; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: AppSettings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(settings.normalized())
}
