use std::path::Path;

use csv::WriterBuilder;

use super::{SNAPSHOT_HEADER, SnapshotError, SnapshotRow};
use crate::atomic_file::atomic_write;

pub(super) fn save_rows(path: &Path, rows: &[SnapshotRow]) -> Result<(), SnapshotError> {
    let bytes = encode_rows(path, rows)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    atomic_write(path, &bytes).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn encode_rows(path: &Path, rows: &[SnapshotRow]) -> Result<Vec<u8>, SnapshotError> {
    let encode_error = |source| SnapshotError::Encode {
        path: path.to_path_buf(),
        source,
    };
    // The header is written by hand so an empty snapshot still carries it.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(SNAPSHOT_HEADER).map_err(encode_error)?;
    for row in rows {
        writer.serialize(row).map_err(encode_error)?;
    }
    writer.into_inner().map_err(|err| SnapshotError::Write {
        path: path.to_path_buf(),
        source: err.into_error(),
    })
}
