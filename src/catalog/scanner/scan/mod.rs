mod errors;
mod runner;
mod stats;

pub use errors::ScanError;
pub use runner::{ScanOutcome, ScanSetup, scan_once, scan_with_progress};
pub use stats::ScanStats;

#[cfg(test)]
mod tests;
