//! `settings.toml` handling: where the snapshot and thumbnail cache live, how
//! video frames are captured, and where run logs are written.

use crate::app_dirs;

mod errors;
mod load;
mod save;
mod types;

#[cfg(test)]
mod tests;

/// Default filename used to store the settings.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

pub use errors::ConfigError;
pub use load::{load_from, load_or_default, settings_path};
pub use save::{save, save_to_path};
pub use types::{AppSettings, CaptureSettings, LoggingSettings};

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
