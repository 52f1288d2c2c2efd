use std::{
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::warn;

use crate::catalog::item::FileEntry;

use super::scan::ScanError;
use super::scan_fs::{read_entry, visit_dir};

/// Enumerate every regular file below `root`, in walk order.
pub(super) fn walk_phase(
    root: &Path,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<FileEntry>, ScanError> {
    let mut entries = Vec::new();
    visit_dir(root, cancel, &mut |path| {
        if let Some(cancel) = cancel
            && cancel.load(Ordering::Relaxed)
        {
            return Err(ScanError::Canceled);
        }
        collect_entry(root, path, &mut entries)
    })?;
    Ok(entries)
}

/// Files whose metadata cannot be read are left out of the scan.
fn collect_entry(root: &Path, path: &Path, entries: &mut Vec<FileEntry>) -> Result<(), ScanError> {
    match read_entry(root, path) {
        Ok(entry) => entries.push(entry),
        Err(ScanError::Io { path, source }) => warn!(
            path = %path.display(),
            error = %source,
            "Failed to read file metadata during scan"
        ),
        Err(err) => return Err(err),
    }
    Ok(())
}
