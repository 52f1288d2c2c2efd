use std::path::PathBuf;
use std::time::Duration;

use tempfile::tempdir;

use super::*;
use crate::app_dirs::{APP_DIR_NAME, ConfigBaseGuard};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let settings = load_from(&dir.path().join("settings.toml")).unwrap();
    assert_eq!(settings, AppSettings::default());
    assert!(settings.capture.enabled);
    assert_eq!(settings.capture.offset(), Duration::from_secs(1));
    assert_eq!(settings.capture.max_edge, 256);
}

#[test]
fn saves_and_reloads_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    let settings = AppSettings {
        snapshot_path: Some(PathBuf::from("/data/cache.csv")),
        capture: CaptureSettings {
            enabled: false,
            workers: 2,
            ..CaptureSettings::default()
        },
        ..AppSettings::default()
    };
    save_to_path(&settings, &path).unwrap();
    assert_eq!(load_from(&path).unwrap(), settings);
}

#[test]
fn partial_file_fills_in_defaults_and_clamps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[capture]\nworkers = 0\nffmpeg_path = \"/opt/ffmpeg\"\n").unwrap();
    let settings = load_from(&path).unwrap();
    assert_eq!(settings.capture.workers, 1);
    assert_eq!(settings.capture.ffmpeg_path, PathBuf::from("/opt/ffmpeg"));
    assert!(settings.capture.enabled);
    assert!(settings.snapshot_path.is_none());
}

#[test]
fn logging_section_is_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "[logging]\nfilter = \"  \"\nkeep_files = 0\nto_file = false\ndir = \"/var/log/shelf\"\n",
    )
    .unwrap();
    let logging = load_from(&path).unwrap().logging;
    assert_eq!(logging.filter, "info");
    assert_eq!(logging.keep_files, 1);
    assert!(!logging.to_file);
    assert_eq!(logging.log_dir().unwrap(), PathBuf::from("/var/log/shelf"));
}

#[test]
fn invalid_toml_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "capture = [").unwrap();
    let err = load_from(&path).unwrap_err();
    match err {
        ConfigError::ParseToml { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn default_locations_live_in_app_dir() {
    let base = tempdir().unwrap();
    let _guard = ConfigBaseGuard::set(base.path().to_path_buf());
    let root = base.path().join(APP_DIR_NAME);
    assert_eq!(settings_path().unwrap(), root.join(SETTINGS_FILE_NAME));

    let settings = load_or_default().unwrap();
    assert_eq!(
        settings.snapshot_path().unwrap(),
        root.join("directory_cache.csv")
    );
    assert_eq!(settings.thumbnail_dir().unwrap(), root.join("thumbnails"));
    assert_eq!(settings.logging.log_dir().unwrap(), root.join("logs"));

    save(&settings).unwrap();
    assert!(root.join(SETTINGS_FILE_NAME).is_file());
}
