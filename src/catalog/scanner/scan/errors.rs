use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::snapshot::SnapshotError;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The provided root path is not a directory.
    #[error("Scan root is not a directory: {0}")]
    InvalidRoot(PathBuf),
    /// Scan was canceled by the caller.
    #[error("Scan canceled")]
    Canceled,
    /// Failed to read a file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The prior snapshot could not be read.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}
