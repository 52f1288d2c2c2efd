//! Whole-file replacement used by the snapshot store and the settings file.

use std::io::{self, Write};
use std::path::Path;

use rand::TryRngCore;

const TEMP_ATTEMPTS: usize = 5;

/// Replace `path` with `data` so readers see either the old or the new file.
///
/// Data goes to a sibling temporary file which is synced and renamed over the
/// target; the parent directory is synced afterwards on unix.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "target path has no parent directory",
            ));
        }
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "target path has no file name")
    })?;

    let mut last_err = None;
    for _ in 0..TEMP_ATTEMPTS {
        let tmp_path = dir.join(format!(
            "{}.tmp-{}",
            file_name.to_string_lossy(),
            random_suffix()?
        ));
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                last_err = Some(err);
                continue;
            }
            Err(err) => return Err(err),
        };

        let written = file.write_all(data).and_then(|()| file.sync_all());
        drop(file);
        if let Err(err) = written.and_then(|()| replace_file(&tmp_path, path)) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err);
        }
        return sync_parent_dir(dir);
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "failed to create temporary file for {}: {}",
            path.display(),
            last_err
                .as_ref()
                .map(|err| err.to_string())
                .unwrap_or_else(|| "unknown error".into())
        ),
    ))
}

fn random_suffix() -> io::Result<String> {
    let mut bytes = [0u8; 6];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|source| io::Error::other(format!("failed to generate temp suffix: {source}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn replace_file(temp_path: &Path, path: &Path) -> io::Result<()> {
    match std::fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            #[cfg(target_os = "windows")]
            if err.kind() == io::ErrorKind::AlreadyExists
                || err.kind() == io::ErrorKind::PermissionDenied
            {
                if let Err(inner) = std::fs::remove_file(path) {
                    if inner.kind() != io::ErrorKind::NotFound {
                        return Err(inner);
                    }
                }
                return std::fs::rename(temp_path, path);
            }
            Err(err)
        }
    }
}

fn sync_parent_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::fs::File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}
