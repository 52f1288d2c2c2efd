use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::catalog::builder::CatalogBuilder;
use crate::catalog::progress::ScanProgressTracker;
use crate::catalog::reconcile::reconcile;
use crate::catalog::shelf::Catalog;
use crate::catalog::snapshot::{SnapshotError, SnapshotRow, SnapshotStore};
use crate::catalog::taxonomy::CategoryTaxonomy;
use crate::catalog::thumbnails::{CaptureBatch, CapturePlan, ThumbnailResolver};

use super::super::scan_fs::{ensure_root_dir, root_name};
use super::super::scan_walk::walk_phase;
use super::{ScanError, ScanStats};

/// Everything a scan needs besides the root directory.
#[derive(Debug, Clone)]
pub struct ScanSetup {
    taxonomy: CategoryTaxonomy,
    snapshot: SnapshotStore,
    capture: Option<CapturePlan>,
}

impl ScanSetup {
    /// Standard taxonomy, no frame capture.
    pub fn new(snapshot: SnapshotStore) -> Self {
        Self {
            taxonomy: CategoryTaxonomy::standard(),
            snapshot,
            capture: None,
        }
    }

    pub fn with_capture(mut self, plan: CapturePlan) -> Self {
        self.capture = Some(plan);
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: CategoryTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    fn resolver(&self) -> ThumbnailResolver {
        match &self.capture {
            Some(plan) => ThumbnailResolver::with_capture(CaptureBatch::start(plan.clone())),
            None => ThumbnailResolver::inline_only(),
        }
    }
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Merged catalog: fresh items plus every retained snapshot row.
    pub catalog: Catalog,
    /// Rows that were written (or attempted) to the snapshot.
    pub rows: Vec<SnapshotRow>,
    pub stats: ScanStats,
    /// Outcome of the snapshot rewrite; the catalog is valid either way.
    pub snapshot_write: Result<(), SnapshotError>,
}

/// Scan `root` once, reconcile against the snapshot, and rewrite it.
pub fn scan_once(root: &Path, setup: &ScanSetup) -> Result<ScanOutcome, ScanError> {
    scan(root, setup, None, None)
}

/// Like [`scan_once`], reporting a percentage after every enumerated file and
/// stopping with [`ScanError::Canceled`] once `cancel` is set.
pub fn scan_with_progress(
    root: &Path,
    setup: &ScanSetup,
    cancel: Option<&AtomicBool>,
    on_progress: &mut impl FnMut(u8, &Path),
) -> Result<ScanOutcome, ScanError> {
    scan(root, setup, cancel, Some(on_progress))
}

fn scan(
    root: &Path,
    setup: &ScanSetup,
    cancel: Option<&AtomicBool>,
    mut on_progress: Option<&mut dyn FnMut(u8, &Path)>,
) -> Result<ScanOutcome, ScanError> {
    let root = ensure_root_dir(root)?;
    let prior = setup.snapshot.load()?;
    let entries = walk_phase(&root, cancel)?;

    let mut stats = ScanStats {
        total_files: entries.len(),
        ..ScanStats::default()
    };
    let mut tracker = ScanProgressTracker::start(entries.len());
    let mut builder = CatalogBuilder::new(&setup.taxonomy, root_name(&root), setup.resolver());
    for entry in &entries {
        if is_canceled(cancel) {
            builder.abandon();
            return Err(ScanError::Canceled);
        }
        builder.accept(entry);
        let percent = tracker.advance();
        if let Some(on_progress) = on_progress.as_mut() {
            on_progress(percent, &entry.source);
        }
    }
    if entries.is_empty()
        && let Some(on_progress) = on_progress.as_mut()
    {
        on_progress(tracker.percent(), &root);
    }

    let (fresh, build_stats) = builder.build_or_cancel(cancel);
    if is_canceled(cancel) {
        return Err(ScanError::Canceled);
    }
    stats.record_build(build_stats);

    let merged = reconcile(&setup.taxonomy, &fresh, prior);
    stats.record_reconcile(merged.report);
    let snapshot_write = setup.snapshot.save(&merged.rows);
    if let Err(err) = &snapshot_write {
        warn!(path = %setup.snapshot.path().display(), error = %err, "Failed to write snapshot");
    }
    info!(
        root = %root.display(),
        files = stats.total_files,
        items = merged.catalog.item_count(),
        skipped = stats.skipped(),
        added = stats.added,
        updated = stats.updated,
        retained = stats.retained,
        captures_failed = stats.captures_failed,
        "Scan finished"
    );
    Ok(ScanOutcome {
        catalog: merged.catalog,
        rows: merged.rows,
        stats,
        snapshot_write,
    })
}

fn is_canceled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|cancel| cancel.load(Ordering::Relaxed))
}
