use serde::Serialize;

use crate::catalog::builder::BuildStats;
use crate::catalog::reconcile::ReconcileReport;

/// Summary of a scan run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Every enumerated file, ignored ones included.
    pub total_files: usize,
    pub classified: usize,
    pub skipped_archive: usize,
    pub skipped_unrecognized: usize,
    pub skipped_shallow: usize,
    pub captures_started: usize,
    pub captures_failed: usize,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub retained: usize,
}

impl ScanStats {
    pub(super) fn record_build(&mut self, build: BuildStats) {
        self.classified = build.classified;
        self.skipped_archive = build.skipped_archive;
        self.skipped_unrecognized = build.skipped_unrecognized;
        self.skipped_shallow = build.skipped_shallow;
        self.captures_started = build.captures_started;
        self.captures_failed = build.captures_failed;
    }

    pub(super) fn record_reconcile(&mut self, report: ReconcileReport) {
        self.added = report.added;
        self.updated = report.updated;
        self.unchanged = report.unchanged;
        self.retained = report.retained;
    }

    /// Files that produced no catalog item.
    pub fn skipped(&self) -> usize {
        self.skipped_archive + self.skipped_unrecognized + self.skipped_shallow
    }
}
