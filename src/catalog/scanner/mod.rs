mod scan;
mod scan_fs;
mod scan_walk;

pub use scan::{ScanError, ScanOutcome, ScanSetup, ScanStats, scan_once, scan_with_progress};
