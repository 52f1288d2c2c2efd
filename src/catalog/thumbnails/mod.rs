//! Thumbnail selection for catalog items.
//!
//! Candidates are ranked; a candidate only replaces the current reference
//! when it ranks strictly higher, so the first candidate of each rank wins.
//! Frame captures for videos run on a [`CaptureBatch`] and are applied after
//! enumeration.

mod batch;
mod cache;
mod capture;

use std::fmt;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::item::{FileEntry, IdentityKey};
use super::media::MediaKind;
use super::taxonomy::Category;

pub use batch::{
    CaptureBatch, CaptureOutcome, CapturePlan, DEFAULT_CAPTURE_OFFSET, DEFAULT_CAPTURE_WORKERS,
};
pub use cache::ThumbnailCache;
pub use capture::{CaptureError, FfmpegCapture, FrameCapture};

const DEFAULT_IMAGE: &str = "builtin:default";
const VIDEO_PLACEHOLDER: &str = "builtin:video-placeholder";

/// Persisted thumbnail reference: a file path or a built-in marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThumbnailRef(String);

impl ThumbnailRef {
    pub fn default_image() -> Self {
        Self(DEFAULT_IMAGE.to_string())
    }

    pub fn video_placeholder() -> Self {
        Self(VIDEO_PLACEHOLDER.to_string())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    /// Rehydrate a reference read back from the snapshot.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_builtin(&self) -> bool {
        self.0 == DEFAULT_IMAGE || self.0 == VIDEO_PLACEHOLDER
    }
}

impl fmt::Display for ThumbnailRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) enum ThumbnailRank {
    #[default]
    Unset,
    FirstImage,
    CapturedFrame,
    SameStemImage,
}

/// Thumbnail state tracked for one item while files stream in.
#[derive(Debug, Clone, Default)]
pub(crate) struct ThumbnailSlot {
    reference: Option<ThumbnailRef>,
    rank: ThumbnailRank,
    capture_requested: bool,
}

impl ThumbnailSlot {
    /// Take `candidate` if it outranks the current reference.
    pub(crate) fn offer(&mut self, candidate: ThumbnailRef, rank: ThumbnailRank) -> bool {
        if rank <= self.rank {
            return false;
        }
        self.reference = Some(candidate);
        self.rank = rank;
        true
    }

    pub(crate) fn rank(&self) -> ThumbnailRank {
        self.rank
    }

    /// Final reference, falling back to the category's built-in image.
    pub(crate) fn resolve(self, category: &Category) -> ThumbnailRef {
        self.reference
            .unwrap_or_else(|| category.fallback_thumbnail())
    }
}

/// Applies the thumbnail priority rules as files are accepted.
#[derive(Debug, Default)]
pub struct ThumbnailResolver {
    batch: Option<CaptureBatch>,
}

impl ThumbnailResolver {
    /// Resolver that never captures video frames.
    pub fn inline_only() -> Self {
        Self { batch: None }
    }

    /// Resolver that hands first-seen videos to `batch`.
    pub fn with_capture(batch: CaptureBatch) -> Self {
        Self { batch: Some(batch) }
    }

    /// Feed one file that belongs to the item identified by `key`.
    pub(crate) fn observe(
        &mut self,
        category: &Category,
        key: &IdentityKey,
        full_path: &str,
        entry: &FileEntry,
        slot: &mut ThumbnailSlot,
    ) {
        match entry.media {
            MediaKind::Image => {
                let rank = if category.prefers_same_stem_image()
                    && entry.stem().eq_ignore_ascii_case(&key.name)
                {
                    ThumbnailRank::SameStemImage
                } else {
                    ThumbnailRank::FirstImage
                };
                slot.offer(ThumbnailRef::from_path(&entry.source), rank);
            }
            MediaKind::Video if category.captures_video => {
                if slot.capture_requested || slot.rank() >= ThumbnailRank::CapturedFrame {
                    return;
                }
                slot.capture_requested = true;
                if let Some(batch) = self.batch.as_mut() {
                    batch.submit(key.clone(), full_path.to_string(), entry.source.clone());
                } else {
                    debug!(item = %full_path, "Frame capture disabled; keeping fallback thumbnail");
                }
            }
            MediaKind::Video | MediaKind::Other => {}
        }
    }

    /// Number of capture jobs handed to the batch so far.
    pub fn captures_submitted(&self) -> usize {
        self.batch.as_ref().map(CaptureBatch::submitted).unwrap_or(0)
    }

    /// Stop pending captures; in-flight jobs finish but nothing new starts.
    pub fn abandon(&self) {
        if let Some(batch) = self.batch.as_ref() {
            batch.abandon();
        }
    }

    /// Wait for every submitted capture and return their outcomes. Queued
    /// captures are skipped once `cancel` is set.
    pub fn finish(self, cancel: Option<&AtomicBool>) -> Vec<CaptureOutcome> {
        match self.batch {
            Some(batch) => batch.join_or_cancel(cancel),
            None => Vec::new(),
        }
    }
}
