//! Path classification: relative file path to catalog identity.

use std::path::Path;

use super::item::{FileEntry, IdentityKey};
use super::media::is_archive_extension;
use super::taxonomy::{CategoryTaxonomy, Shape};

/// Why an enumerated file produced no catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Compressed archive extension.
    Archive,
    /// First segment is not a real taxonomy category.
    UnrecognizedCategory,
    /// Too few path segments for the category's shape.
    Shallow,
}

/// Result of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Item(IdentityKey),
    Ignored(SkipReason),
}

/// Classify an enumerated entry against the taxonomy.
pub fn classify(taxonomy: &CategoryTaxonomy, entry: &FileEntry) -> Classification {
    classify_segments(taxonomy, &entry.segments, &entry.extension)
}

/// Classify path segments below the root (category first, file name last).
///
/// Rules apply in order: archive extensions are ignored, then unknown
/// categories, then paths too shallow for the category's shape. The item
/// segment loses its extension only when it is the file itself; directory
/// names are kept verbatim.
pub fn classify_segments(
    taxonomy: &CategoryTaxonomy,
    segments: &[String],
    extension: &str,
) -> Classification {
    if is_archive_extension(extension) {
        return Classification::Ignored(SkipReason::Archive);
    }
    let Some(category) = segments.first().and_then(|id| taxonomy.get(id)) else {
        return Classification::Ignored(SkipReason::UnrecognizedCategory);
    };
    if segments.len() < category.shape.min_segments() {
        return Classification::Ignored(SkipReason::Shallow);
    }
    let (group, item_index) = match category.shape {
        Shape::Flat => (String::new(), 1),
        Shape::Grouped(_) => (segments[1].clone(), 2),
    };
    let name = item_name(&segments[item_index], item_index + 1 == segments.len());
    Classification::Item(IdentityKey::new(category.id.clone(), group, name))
}

fn item_name(segment: &str, is_file: bool) -> String {
    if !is_file {
        return segment.to_string();
    }
    Path::new(segment)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| segment.to_string())
}
