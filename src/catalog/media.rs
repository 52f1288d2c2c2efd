use serde::Serialize;

/// Compressed archive extensions that never contribute catalog items (lowercase, without dots).
pub(crate) const ARCHIVE_EXTENSIONS: [&str; 5] = ["zip", "rar", "7z", "tar", "gz"];

const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "avif", "tif", "tiff",
];

const VIDEO_EXTENSIONS: [&str; 11] = [
    "mp4", "m4v", "mkv", "webm", "avi", "mov", "wmv", "flv", "mpg", "mpeg", "ts",
];

/// Coarse media type of an enumerated file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify an extension (without the dot, any case).
    pub fn from_extension(extension: &str) -> Self {
        if matches_any(&IMAGE_EXTENSIONS, extension) {
            MediaKind::Image
        } else if matches_any(&VIDEO_EXTENSIONS, extension) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }
}

/// Return true if the extension names a compressed archive.
pub(crate) fn is_archive_extension(extension: &str) -> bool {
    matches_any(&ARCHIVE_EXTENSIONS, extension)
}

fn matches_any(table: &[&str], extension: &str) -> bool {
    table
        .iter()
        .any(|candidate| extension.eq_ignore_ascii_case(candidate))
}
