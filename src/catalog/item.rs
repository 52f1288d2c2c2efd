use std::path::{Path, PathBuf};

use serde::Serialize;

use super::media::MediaKind;
use super::thumbnails::ThumbnailRef;

/// `(category, group, name)` tuple identifying one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    pub category: String,
    /// Empty for flat categories.
    pub group: String,
    pub name: String,
}

impl IdentityKey {
    pub fn new(
        category: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            group: group.into(),
            name: name.into(),
        }
    }

    /// `root/category[/group]/name`
    pub fn full_path(&self, root: &str) -> String {
        if self.group.is_empty() {
            format!("{root}/{}/{}", self.category, self.name)
        } else {
            format!("{root}/{}/{}/{}", self.category, self.group, self.name)
        }
    }
}

/// One cataloged work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub name: String,
    pub category: String,
    pub group: String,
    pub full_path: String,
    pub thumbnail: Option<ThumbnailRef>,
    /// Milliseconds relative to the Unix epoch, negative for earlier times.
    pub modified_ms: i64,
}

impl Item {
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.category, &self.group, &self.name)
    }
}

/// A file produced by directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path components below the scanned root, ending with the file name.
    pub segments: Vec<String>,
    /// Extension without the dot, as found on disk.
    pub extension: String,
    pub media: MediaKind,
    /// Milliseconds since the Unix epoch.
    pub modified_ms: i64,
    /// Absolute location used to read the file's contents.
    pub source: PathBuf,
}

impl FileEntry {
    /// Build an entry, deriving extension and media type from the last segment.
    pub fn new(segments: Vec<String>, modified_ms: i64, source: PathBuf) -> Self {
        let extension = segments
            .last()
            .and_then(|name| Path::new(name).extension())
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media = MediaKind::from_extension(&extension);
        Self {
            segments,
            extension,
            media,
            modified_ms,
            source,
        }
    }

    pub fn file_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name)
    }
}
