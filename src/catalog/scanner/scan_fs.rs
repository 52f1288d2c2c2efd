use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::warn;

use crate::catalog::item::FileEntry;

use super::scan::ScanError;

pub(super) fn ensure_root_dir(root: &Path) -> Result<PathBuf, ScanError> {
    if root.is_dir() {
        Ok(root.to_path_buf())
    } else {
        Err(ScanError::InvalidRoot(root.to_path_buf()))
    }
}

/// Final component of the scanned directory, used to prefix full paths.
pub(super) fn root_name(root: &Path) -> String {
    let named = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    named
        .or_else(|| {
            root.canonicalize().ok().and_then(|canonical| {
                canonical
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
        })
        .unwrap_or_default()
}

/// Depth-first walk in file-name order: a directory's files are visited
/// before its subdirectories. Symlinks are skipped.
pub(super) fn visit_dir(
    root: &Path,
    cancel: Option<&AtomicBool>,
    visitor: &mut impl FnMut(&Path) -> Result<(), ScanError>,
) -> Result<(), ScanError> {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if let Some(cancel) = cancel
            && cancel.load(Ordering::Relaxed)
        {
            return Err(ScanError::Canceled);
        }
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if dir != root => {
                warn!(
                    dir = %dir.display(),
                    error = %source,
                    "Failed to read directory during scan"
                );
                continue;
            }
            Err(source) => {
                return Err(ScanError::Io {
                    path: dir.clone(),
                    source,
                });
            }
        };
        let mut listed = Vec::new();
        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        dir = %dir.display(),
                        error = %err,
                        "Failed to read directory entry during scan"
                    );
                    continue;
                }
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(file_type) => listed.push((entry.file_name(), path, file_type)),
                Err(err) => warn!(
                    path = %path.display(),
                    error = %err,
                    "Failed to read file type during scan"
                ),
            }
        }
        listed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut subdirs = Vec::new();
        for (_, path, file_type) in listed {
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                subdirs.push(path);
            } else if file_type.is_file() {
                visitor(&path)?;
            }
        }
        stack.extend(subdirs.into_iter().rev());
    }
    Ok(())
}

pub(super) fn read_entry(root: &Path, path: &Path) -> Result<FileEntry, ScanError> {
    let relative = strip_relative(root, path)?;
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    let meta = path.metadata().map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let modified = meta.modified().map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FileEntry::new(segments, to_millis(modified), path.to_path_buf()))
}

fn strip_relative(root: &Path, path: &Path) -> Result<PathBuf, ScanError> {
    if let Ok(relative) = path.strip_prefix(root) {
        return Ok(PathBuf::from(relative));
    }
    if let (Ok(canon_root), Ok(canon_path)) = (root.canonicalize(), path.canonicalize())
        && let Ok(relative) = canon_path.strip_prefix(&canon_root)
    {
        return Ok(PathBuf::from(relative));
    }
    Err(ScanError::InvalidRoot(path.to_path_buf()))
}

/// Milliseconds relative to the Unix epoch; earlier times are negative.
fn to_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis())
            .map(|ms| -ms)
            .unwrap_or(i64::MIN),
    }
}
