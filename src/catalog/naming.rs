//! Display-name parsing for catalog items.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Marker a release folder carries once the work is finished.
pub const COMPLETE_MARKER: &str = "(완)";

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*\)").expect("parenthesized regex must compile"));

/// Version of a titled release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Version {
    /// The folder carries the completion marker.
    Complete,
    /// Text after the last space of the folder name.
    Named(String),
    /// No version could be derived.
    Unknown,
}

/// Parsed, display-ready label of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLabel {
    pub title: String,
    pub version: Option<Version>,
    pub author: Option<String>,
}

impl ItemLabel {
    pub fn plain(name: &str) -> Self {
        Self {
            title: name.to_string(),
            version: None,
            author: None,
        }
    }
}

/// Split `Title 1.02` into title and version; `Title (완)` is complete.
pub fn versioned_title(name: &str) -> ItemLabel {
    let (title, version) = if name.contains(COMPLETE_MARKER) {
        (name.replace(COMPLETE_MARKER, "").trim().to_string(), Version::Complete)
    } else {
        match name.rfind(' ') {
            Some(idx) => (
                name[..idx].trim().to_string(),
                Version::Named(name[idx + 1..].trim().to_string()),
            ),
            None => (name.to_string(), Version::Unknown),
        }
    };
    ItemLabel {
        title,
        version: Some(version),
        author: None,
    }
}

/// Author name from a group folder, dropping parenthesized notes.
pub fn author_name(group: &str) -> String {
    PARENTHESIZED.replace(group, "").trim().to_string()
}
