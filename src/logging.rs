//! Tracing setup for the `mediashelf` binary.
//!
//! Events go to stderr so the catalog printed on stdout stays clean. When
//! enabled, every run also appends to its own `mediashelf_<stamp>.log` in the
//! log directory, and run logs beyond [`LoggingSettings::keep_files`] are
//! removed oldest first.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{
    OffsetDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use tracing::warn;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::AppDirError;
use crate::config::LoggingSettings;

const RUN_LOG_PREFIX: &str = "mediashelf_";
const RUN_LOG_EXTENSION: &str = ".log";
const FALLBACK_FILTER: &str = "info";

/// Set once the global subscriber is installed; holds the file writer guard.
static INSTALLED: OnceLock<Option<WorkerGuard>> = OnceLock::new();

/// Errors that prevent logging from being installed.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No log directory available: {0}")]
    LogDir(#[from] AppDirError),
    #[error("Failed to prepare run log {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format run log timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber described by `settings`.
///
/// Returns the run log path when file logging is on. Later calls do nothing
/// and return `Ok(None)`. `RUST_LOG` overrides `settings.filter`.
pub fn init(settings: &LoggingSettings) -> Result<Option<PathBuf>, LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(None);
    }

    let run_log = if settings.to_file {
        let dir = settings.log_dir()?;
        Some(open_run_log(&dir, now_local_or_utc())?)
    } else {
        None
    };

    let timer = fmt::time::OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        Rfc3339,
    );
    let (file_layer, guard) = match &run_log {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            let (writer, guard) = tracing_appender::non_blocking(rolling::never(dir, name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_timer(timer.clone())
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    let stderr_layer = fmt::layer()
        .with_timer(timer)
        .with_writer(std::io::stderr);

    let subscriber = Registry::default()
        .with(scan_filter(&settings.filter))
        .with(stderr_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INSTALLED.set(guard);

    if let Some(path) = &run_log
        && let Some(dir) = path.parent()
    {
        prune_run_logs(dir, settings.keep_files);
    }
    Ok(run_log)
}

fn scan_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Create `dir` and this run's log file inside it.
fn open_run_log(dir: &Path, now: OffsetDateTime) -> Result<PathBuf, LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(run_log_name(now)?);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr), LoggingError> {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => Ok((dir, name)),
        _ => Err(LoggingError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        }),
    }
}

fn run_log_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[BorrowedFormatItem<'_>] =
        format_description!("[year][month][day]-[hour][minute][second]");
    Ok(format!("{RUN_LOG_PREFIX}{}{RUN_LOG_EXTENSION}", now.format(STAMP)?))
}

/// Remove the oldest run logs so at most `keep` remain. Stamped names sort
/// chronologically; other files in `dir` are left alone.
fn prune_run_logs(dir: &Path, keep: usize) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "Failed to list run logs");
            return;
        }
    };
    let mut run_logs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_run_log(path))
        .collect();
    run_logs.sort_unstable_by(|a, b| b.cmp(a));
    for stale in run_logs.into_iter().skip(keep) {
        if let Err(err) = fs::remove_file(&stale) {
            warn!(path = %stale.display(), error = %err, "Failed to remove old run log");
        }
    }
}

fn is_run_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name.starts_with(RUN_LOG_PREFIX) && name.ends_with(RUN_LOG_EXTENSION)
        })
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
