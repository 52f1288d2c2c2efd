//! Media catalog: classification of library files into categories, groups and
//! items, thumbnail selection, and reconciliation with the persisted snapshot.

pub mod builder;
pub mod classify;
pub mod item;
pub mod media;
pub mod naming;
pub mod progress;
pub mod reconcile;
pub mod scanner;
pub mod shelf;
pub mod snapshot;
pub mod taxonomy;
pub mod thumbnails;
pub mod view;

pub use builder::{BuildStats, CatalogBuilder};
pub use classify::{Classification, SkipReason, classify};
pub use item::{FileEntry, IdentityKey, Item};
pub use media::MediaKind;
pub use naming::{ItemLabel, Version};
pub use progress::ScanProgressTracker;
pub use reconcile::{ReconcileReport, Reconciliation, reconcile};
pub use scanner::{ScanError, ScanOutcome, ScanSetup, ScanStats, scan_once, scan_with_progress};
pub use shelf::{Catalog, CategoryShelf, Group, Shelf};
pub use snapshot::{SnapshotError, SnapshotRow, SnapshotStore};
pub use taxonomy::{ALL_CATEGORY_ID, Category, CategoryTaxonomy, Shape};
pub use thumbnails::{
    CaptureError, CapturePlan, FfmpegCapture, FrameCapture, ThumbnailCache, ThumbnailRef,
    ThumbnailResolver,
};
pub use view::{CategoryFilter, SortOrder, ViewError};
