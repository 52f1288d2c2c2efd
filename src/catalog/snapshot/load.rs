use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use super::{SnapshotError, SnapshotRow};

pub(super) fn load_rows(path: &Path) -> Result<Vec<SnapshotRow>, SnapshotError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot yet; starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(SnapshotError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes.as_slice());
    let mut rows = Vec::new();
    for record in reader.deserialize::<SnapshotRow>() {
        let row = record.map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    Ok(collapse_duplicates(path, rows))
}

/// Keep one row per full path: the one with the latest modification date,
/// at the position of the first occurrence.
fn collapse_duplicates(path: &Path, rows: Vec<SnapshotRow>) -> Vec<SnapshotRow> {
    let mut kept: Vec<SnapshotRow> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in rows {
        match positions.get(&row.full_path) {
            Some(&index) => {
                warn!(
                    path = %path.display(),
                    item = %row.full_path,
                    "Duplicate snapshot row; keeping the most recent"
                );
                if row.modification_date > kept[index].modification_date {
                    kept[index] = row;
                }
            }
            None => {
                positions.insert(row.full_path.clone(), kept.len());
                kept.push(row);
            }
        }
    }
    kept
}
