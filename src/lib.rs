//! Library exports for reuse in benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// Media catalog scanning and snapshot reconciliation.
pub mod catalog;
/// Settings file handling.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;

mod atomic_file;
