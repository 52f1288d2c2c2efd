use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app_dirs::{self, AppDirError};
use crate::catalog::snapshot::SNAPSHOT_FILE_NAME;

const MAX_CAPTURE_WORKERS: usize = 32;

/// Settings stored in `settings.toml`.
///
/// Config keys (TOML): `snapshot_path`, `thumbnail_cache_dir`, `capture`,
/// `logging`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Override for the snapshot file; defaults to `directory_cache.csv` in
    /// the app directory.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// Override for the captured-frame cache directory.
    #[serde(default)]
    pub thumbnail_cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppSettings {
    pub(crate) fn normalized(self) -> Self {
        Self {
            capture: self.capture.normalized(),
            logging: self.logging.normalized(),
            ..self
        }
    }

    /// Snapshot file location, resolving the default inside the app directory.
    pub fn snapshot_path(&self) -> Result<PathBuf, AppDirError> {
        match &self.snapshot_path {
            Some(path) => Ok(path.clone()),
            None => Ok(app_dirs::app_root_dir()?.join(SNAPSHOT_FILE_NAME)),
        }
    }

    /// Thumbnail cache directory, resolving the default inside the app directory.
    pub fn thumbnail_dir(&self) -> Result<PathBuf, AppDirError> {
        match &self.thumbnail_cache_dir {
            Some(path) => Ok(path.clone()),
            None => app_dirs::thumbnails_dir(),
        }
    }
}

/// Video frame capture options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Position of the captured frame, in milliseconds into playback.
    #[serde(default = "default_offset_ms")]
    pub offset_ms: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Longest edge of stored thumbnails, in pixels.
    #[serde(default = "default_max_edge")]
    pub max_edge: u32,
}

impl CaptureSettings {
    pub(crate) fn normalized(self) -> Self {
        Self {
            workers: self.workers.clamp(1, MAX_CAPTURE_WORKERS),
            max_edge: self.max_edge.max(1),
            ..self
        }
    }

    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.offset_ms)
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ffmpeg_path: default_ffmpeg_path(),
            offset_ms: default_offset_ms(),
            workers: default_workers(),
            max_edge: default_max_edge(),
        }
    }
}

/// Where scan logs go and how many are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write a log file per run in addition to stderr.
    #[serde(default = "default_true")]
    pub to_file: bool,
    /// Override for the log directory; defaults to `logs/` in the app directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Number of run logs kept after pruning.
    #[serde(default = "default_keep_files")]
    pub keep_files: usize,
}

impl LoggingSettings {
    pub(crate) fn normalized(self) -> Self {
        let filter = self.filter.trim();
        Self {
            filter: if filter.is_empty() {
                default_log_filter()
            } else {
                filter.to_string()
            },
            keep_files: self.keep_files.max(1),
            ..self
        }
    }

    /// Log directory, resolving the default inside the app directory.
    pub fn log_dir(&self) -> Result<PathBuf, AppDirError> {
        match &self.dir {
            Some(path) => Ok(path.clone()),
            None => app_dirs::logs_dir(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            to_file: default_true(),
            dir: None,
            keep_files: default_keep_files(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_keep_files() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_offset_ms() -> u64 {
    1_000
}

fn default_workers() -> usize {
    crate::catalog::thumbnails::DEFAULT_CAPTURE_WORKERS
}

fn default_max_edge() -> u32 {
    256
}
