use super::*;
use crate::catalog::item::IdentityKey;
use crate::catalog::shelf::Shelf;
use crate::catalog::snapshot::SnapshotStore;
use crate::catalog::thumbnails::test_support::FakeCapture;
use crate::catalog::thumbnails::{CapturePlan, ThumbnailCache, ThumbnailRef};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, UNIX_EPOCH};
use tempfile::{TempDir, tempdir};

fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    snapshot: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Library");
    std::fs::create_dir_all(&root).unwrap();
    let snapshot = dir.path().join("state").join("directory_cache.csv");
    Fixture {
        root,
        snapshot,
        _dir: dir,
    }
}

impl Fixture {
    fn setup(&self) -> ScanSetup {
        ScanSetup::new(SnapshotStore::new(&self.snapshot))
    }
}

#[test]
fn scan_builds_catalog_and_writes_snapshot() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory1/Title 1.0/game.exe", b"x");
    write_file(&fx.root, "DesiredCategory1/Title 1.0/cover.png", b"x");
    write_file(&fx.root, "DesiredCategory6/ArtistX/Work1.mp4", b"x");
    write_file(&fx.root, "DesiredCategory6/ArtistX/Work1.jpg", b"x");
    write_file(&fx.root, "notes.txt", b"x");

    let outcome = scan_once(&fx.root, &fx.setup()).unwrap();
    assert!(outcome.snapshot_write.is_ok());
    assert_eq!(outcome.stats.total_files, 5);
    assert_eq!(outcome.stats.skipped_unrecognized, 1);
    assert_eq!(outcome.stats.added, 2);
    assert_eq!(outcome.catalog.item_count(), 2);

    let title = outcome
        .catalog
        .find(&IdentityKey::new("DesiredCategory1", "", "Title 1.0"))
        .unwrap();
    assert_eq!(title.full_path, "Library/DesiredCategory1/Title 1.0");
    let cover = fx.root.join("DesiredCategory1/Title 1.0/cover.png");
    assert_eq!(
        title.thumbnail,
        Some(ThumbnailRef::from_path(&cover))
    );

    let work = outcome
        .catalog
        .find(&IdentityKey::new("DesiredCategory6", "ArtistX", "Work1"))
        .unwrap();
    let jpg = fx.root.join("DesiredCategory6/ArtistX/Work1.jpg");
    assert_eq!(work.thumbnail, Some(ThumbnailRef::from_path(&jpg)));

    let rows = SnapshotStore::new(&fx.snapshot).load().unwrap();
    assert_eq!(rows, outcome.rows);
    assert_eq!(rows.len(), 2);
}

#[test]
fn archives_are_skipped_but_counted_for_progress() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory2/Game/bundle.zip", b"x");
    write_file(&fx.root, "DesiredCategory2/Game/readme.txt", b"x");

    let mut reports = Vec::new();
    let outcome = scan_with_progress(&fx.root, &fx.setup(), None, &mut |percent, _| {
        reports.push(percent)
    })
    .unwrap();
    assert_eq!(reports, vec![50, 100]);
    assert_eq!(outcome.stats.skipped_archive, 1);
    assert_eq!(outcome.stats.classified, 1);
    assert_eq!(outcome.catalog.item_count(), 1);
}

#[test]
fn empty_root_reports_complete() {
    let fx = fixture();
    let mut reports = Vec::new();
    let outcome = scan_with_progress(&fx.root, &fx.setup(), None, &mut |percent, _| {
        reports.push(percent)
    })
    .unwrap();
    assert_eq!(reports, vec![100]);
    assert!(outcome.catalog.is_empty());
}

#[test]
fn deleted_items_are_retained_from_snapshot() {
    let fx = fixture();
    let gone = write_file(&fx.root, "DesiredCategory3/Gone/a.png", b"x");
    write_file(&fx.root, "DesiredCategory3/Kept/b.png", b"x");
    let first = scan_once(&fx.root, &fx.setup()).unwrap();
    assert_eq!(first.catalog.item_count(), 2);

    std::fs::remove_file(&gone).unwrap();
    let second = scan_once(&fx.root, &fx.setup()).unwrap();
    assert_eq!(second.catalog.item_count(), 2);
    assert_eq!(second.stats.retained, 1);
    assert_eq!(second.stats.unchanged, 1);
    assert!(
        second
            .catalog
            .find(&IdentityKey::new("DesiredCategory3", "", "Gone"))
            .is_some()
    );
}

#[test]
fn rescan_without_changes_is_stable() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory4/A/a.png", b"x");
    write_file(&fx.root, "DesiredCategory7/Clips/Trip/part1.mp4", b"x");
    let first = scan_once(&fx.root, &fx.setup()).unwrap();
    let second = scan_once(&fx.root, &fx.setup()).unwrap();
    assert_eq!(first.rows, second.rows);
    assert_eq!(second.stats.unchanged, 2);
    assert_eq!(second.stats.added + second.stats.updated, 0);
}

#[test]
fn video_items_use_captured_frames() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory7/Clips/Trip.mp4", b"x");
    write_file(&fx.root, "DesiredCategory7/Clips/Broken.mp4", b"x");
    let cache = ThumbnailCache::new(fx.root.parent().unwrap().join("thumbs"), 16);
    let capture = Arc::new(FakeCapture::failing_on(&["Broken.mp4"]));
    let setup = fx
        .setup()
        .with_capture(CapturePlan::new(capture.clone(), cache.clone()).with_workers(2));

    let outcome = scan_once(&fx.root, &setup).unwrap();
    assert_eq!(outcome.stats.captures_started, 2);
    assert_eq!(outcome.stats.captures_failed, 1);
    let trip = outcome
        .catalog
        .find(&IdentityKey::new("DesiredCategory7", "Clips", "Trip"))
        .unwrap();
    assert_eq!(
        trip.thumbnail,
        Some(ThumbnailRef::from_path(
            &cache.path_for("Library/DesiredCategory7/Clips/Trip")
        ))
    );
    let broken = outcome
        .catalog
        .find(&IdentityKey::new("DesiredCategory7", "Clips", "Broken"))
        .unwrap();
    assert_eq!(broken.thumbnail, Some(ThumbnailRef::video_placeholder()));
    assert!(matches!(
        outcome.catalog.shelf("DesiredCategory7"),
        Some(Shelf::Grouped(groups)) if groups.len() == 1
    ));
}

#[test]
fn cancel_aborts_without_touching_snapshot() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory2/A/a.png", b"x");
    write_file(&fx.root, "DesiredCategory2/B/b.png", b"x");
    scan_once(&fx.root, &fx.setup()).unwrap();
    let before = std::fs::read(&fx.snapshot).unwrap();

    write_file(&fx.root, "DesiredCategory2/C/c.png", b"x");
    let cancel = AtomicBool::new(false);
    let result = scan_with_progress(&fx.root, &fx.setup(), Some(&cancel), &mut |_, _| {
        cancel.store(true, Ordering::Relaxed);
    });
    assert!(matches!(result, Err(ScanError::Canceled)));
    assert_eq!(std::fs::read(&fx.snapshot).unwrap(), before);
}

#[test]
fn cancel_during_capture_join_skips_queued_captures() {
    let fx = fixture();
    for idx in 0..6 {
        write_file(&fx.root, &format!("DesiredCategory7/Clips/clip{idx}.mp4"), b"x");
    }
    write_file(&fx.root, "DesiredCategory2/A/a.png", b"x");
    scan_once(&fx.root, &fx.setup()).unwrap();
    let before = std::fs::read(&fx.snapshot).unwrap();

    let cache = ThumbnailCache::new(fx.root.parent().unwrap().join("thumbs"), 16);
    let capture = Arc::new(FakeCapture::default().with_delay(Duration::from_millis(200)));
    let setup = fx
        .setup()
        .with_capture(CapturePlan::new(capture.clone(), cache).with_workers(1));

    let cancel = Arc::new(AtomicBool::new(false));
    let trigger = {
        let cancel = Arc::clone(&cancel);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            cancel.store(true, Ordering::Relaxed);
        })
    };
    let started = Instant::now();
    let result = scan_with_progress(&fx.root, &setup, Some(&cancel), &mut |_, _| {});
    trigger.join().unwrap();

    assert!(matches!(result, Err(ScanError::Canceled)));
    assert!(capture.call_count() < 6);
    assert!(started.elapsed() < Duration::from_millis(6 * 200));
    assert_eq!(std::fs::read(&fx.snapshot).unwrap(), before);
}

#[test]
fn file_dated_before_epoch_is_cataloged() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory2/A/a.png", b"x");
    let old = write_file(&fx.root, "DesiredCategory2/B/b.png", b"x");
    let ten_years = Duration::from_secs(10 * 365 * 86_400);
    std::fs::File::options()
        .write(true)
        .open(&old)
        .unwrap()
        .set_modified(UNIX_EPOCH - ten_years)
        .unwrap();

    let outcome = scan_once(&fx.root, &fx.setup()).unwrap();
    assert_eq!(outcome.catalog.item_count(), 2);
    let item = outcome
        .catalog
        .find(&IdentityKey::new("DesiredCategory2", "", "B"))
        .unwrap();
    assert!(item.modified_ms < 0);

    let rescan = scan_once(&fx.root, &fx.setup()).unwrap();
    assert_eq!(rescan.stats.unchanged, 2);
}

#[test]
fn canceled_before_start_skips_enumeration() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory2/A/a.png", b"x");
    let cancel = AtomicBool::new(true);
    let result = scan_with_progress(&fx.root, &fx.setup(), Some(&cancel), &mut |_, _| {});
    assert!(matches!(result, Err(ScanError::Canceled)));
    assert!(!fx.snapshot.exists());
}

#[test]
fn malformed_snapshot_aborts_scan() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory2/A/a.png", b"x");
    std::fs::create_dir_all(fx.snapshot.parent().unwrap()).unwrap();
    std::fs::write(
        &fx.snapshot,
        "category,subCategory,artist,workName,fullPath,thumbnail,modificationDate\n\
         DesiredCategory2,,,A,Library/DesiredCategory2/A,,yesterday\n",
    )
    .unwrap();
    let result = scan_once(&fx.root, &fx.setup());
    assert!(matches!(result, Err(ScanError::Snapshot(_))));
}

#[cfg(unix)]
#[test]
fn snapshot_write_failure_still_returns_catalog() {
    let fx = fixture();
    write_file(&fx.root, "DesiredCategory2/A/a.png", b"x");
    // Dangling symlink as the parent: reads see no file, writes cannot create it.
    let parent = fx.root.parent().unwrap().join("dangling");
    std::os::unix::fs::symlink(fx.root.parent().unwrap().join("nowhere"), &parent).unwrap();
    let setup = ScanSetup::new(SnapshotStore::new(parent.join("directory_cache.csv")));

    let outcome = scan_once(&fx.root, &setup).unwrap();
    assert!(outcome.snapshot_write.is_err());
    assert_eq!(outcome.catalog.item_count(), 1);
    assert_eq!(outcome.rows.len(), 1);
}

#[test]
fn missing_root_is_invalid() {
    let fx = fixture();
    let result = scan_once(&fx.root.join("missing"), &fx.setup());
    assert!(matches!(result, Err(ScanError::InvalidRoot(_))));
}
