//! Persisted CSV copy of the last reconciled catalog.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::Item;
use super::taxonomy::{CategoryTaxonomy, GroupKind, Shape};
use super::thumbnails::ThumbnailRef;

mod load;
mod save;


/// Default file name of the snapshot inside the app directory.
pub const SNAPSHOT_FILE_NAME: &str = "directory_cache.csv";

/// Column names, in file order.
pub const SNAPSHOT_HEADER: [&str; 7] = [
    "category",
    "subCategory",
    "artist",
    "workName",
    "fullPath",
    "thumbnail",
    "modificationDate",
];

/// One persisted item, keyed by `full_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub category: String,
    /// Group key for two-level categories, empty otherwise.
    #[serde(rename = "subCategory")]
    pub sub_category: String,
    /// Repeats the group for categories grouped by artist.
    pub artist: String,
    #[serde(rename = "workName")]
    pub work_name: String,
    #[serde(rename = "fullPath")]
    pub full_path: String,
    pub thumbnail: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "modificationDate")]
    pub modification_date: i64,
}

impl SnapshotRow {
    pub fn from_item(taxonomy: &CategoryTaxonomy, item: &Item) -> Self {
        let grouped_by_artist = taxonomy
            .get(&item.category)
            .is_some_and(|category| category.shape == Shape::Grouped(GroupKind::Artist));
        Self {
            category: item.category.clone(),
            sub_category: item.group.clone(),
            artist: if grouped_by_artist {
                item.group.clone()
            } else {
                String::new()
            },
            work_name: item.name.clone(),
            full_path: item.full_path.clone(),
            thumbnail: item
                .thumbnail
                .as_ref()
                .map(|thumb| thumb.as_str().to_string())
                .unwrap_or_default(),
            modification_date: item.modified_ms,
        }
    }

    pub fn to_item(&self) -> Item {
        Item {
            name: self.work_name.clone(),
            category: self.category.clone(),
            group: self.sub_category.clone(),
            full_path: self.full_path.clone(),
            thumbnail: (!self.thumbnail.is_empty())
                .then(|| ThumbnailRef::from_stored(self.thumbnail.clone())),
            modified_ms: self.modification_date,
        }
    }
}

/// Errors raised while reading or writing the snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed snapshot {path}: {source}")]
    Parse { path: PathBuf, source: csv::Error },
    #[error("Failed to encode snapshot {path}: {source}")]
    Encode { path: PathBuf, source: csv::Error },
    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Snapshot file at a fixed location; read whole, rewritten whole.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row; a missing file is an empty snapshot.
    pub fn load(&self) -> Result<Vec<SnapshotRow>, SnapshotError> {
        load::load_rows(&self.path)
    }

    /// Replace the file with `rows`, atomically.
    pub fn save(&self, rows: &[SnapshotRow]) -> Result<(), SnapshotError> {
        save::save_rows(&self.path, rows)
    }
}
