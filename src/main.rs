//! Command-line entry point: scan a library directory and print its catalog.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use mediashelf::catalog::naming::Version;
use mediashelf::catalog::view::{self, CategoryFilter, SortOrder};
use mediashelf::catalog::{
    Catalog, CapturePlan, CategoryTaxonomy, FfmpegCapture, ScanSetup, ScanStats, Shelf,
    SnapshotStore, ThumbnailCache, scan_with_progress,
};
use mediashelf::config::{self, AppSettings};
use mediashelf::logging;
use serde::Serialize;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    match logging::init(&settings.logging) {
        Ok(Some(run_log)) => tracing::debug!(path = %run_log.display(), "Writing run log"),
        Ok(None) => {}
        Err(err) => eprintln!("Logging disabled: {err}"),
    }
    let setup = build_setup(&options, &settings)?;
    let filter = match options.category.as_deref() {
        Some(id) => CategoryFilter::from_id(setup.taxonomy(), id).map_err(|err| err.to_string())?,
        None => CategoryFilter::All,
    };

    let mut last_percent = None;
    let outcome = scan_with_progress(&options.root, &setup, None, &mut |percent, _| {
        if last_percent != Some(percent) {
            last_percent = Some(percent);
            eprint!("\rScanning... {percent:>3}%");
            let _ = std::io::stderr().flush();
        }
    })
    .map_err(|err| err.to_string())?;
    eprintln!();

    let shown = view::apply(&outcome.catalog, setup.taxonomy(), &filter, options.sort);
    if options.json {
        let report = JsonReport {
            catalog: &shown,
            stats: &outcome.stats,
        };
        let text = serde_json::to_string_pretty(&report).map_err(|err| err.to_string())?;
        println!("{text}");
    } else {
        print_catalog(&shown, setup.taxonomy());
        print_summary(&outcome.catalog, setup.taxonomy(), &outcome.stats);
    }

    outcome.snapshot_write.map_err(|err| {
        format!(
            "Catalog was built but the snapshot at {} was not updated: {err}",
            setup.snapshot().path().display()
        )
    })
}

fn build_setup(options: &CliOptions, settings: &AppSettings) -> Result<ScanSetup, String> {
    let snapshot_path = match &options.snapshot {
        Some(path) => path.clone(),
        None => settings.snapshot_path().map_err(|err| err.to_string())?,
    };
    let setup = ScanSetup::new(SnapshotStore::new(snapshot_path));
    if options.no_capture || !settings.capture.enabled {
        return Ok(setup);
    }
    let cache_dir = settings.thumbnail_dir().map_err(|err| err.to_string())?;
    let capture = FfmpegCapture::new(&settings.capture.ffmpeg_path);
    let plan = CapturePlan::new(
        Arc::new(capture),
        ThumbnailCache::new(cache_dir, settings.capture.max_edge),
    )
    .with_offset(settings.capture.offset())
    .with_workers(settings.capture.workers);
    Ok(setup.with_capture(plan))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    catalog: &'a Catalog,
    stats: &'a ScanStats,
}

fn print_catalog(catalog: &Catalog, taxonomy: &CategoryTaxonomy) {
    for entry in catalog.shelves() {
        let Some(category) = taxonomy.get(&entry.category) else {
            continue;
        };
        println!("{} ({})", entry.category, entry.shelf.len());
        match &entry.shelf {
            Shelf::Flat(items) => {
                for item in items {
                    println!("  {}", describe(&category.label(item)));
                }
            }
            Shelf::Grouped(groups) => {
                for group in groups {
                    println!("  {}/", group.key);
                    for item in &group.items {
                        println!("    {}", describe(&category.label(item)));
                    }
                }
            }
        }
    }
}

fn describe(label: &mediashelf::catalog::ItemLabel) -> String {
    let mut text = label.title.clone();
    match &label.version {
        Some(Version::Complete) => text.push_str(" [complete]"),
        Some(Version::Named(version)) => text.push_str(&format!(" [{version}]")),
        Some(Version::Unknown) | None => {}
    }
    if let Some(author) = &label.author {
        text.push_str(&format!(" by {author}"));
    }
    text
}

fn print_summary(catalog: &Catalog, taxonomy: &CategoryTaxonomy, stats: &ScanStats) {
    println!();
    for line in summary_lines(catalog, taxonomy, stats) {
        println!("{line}");
    }
}

fn summary_lines(
    catalog: &Catalog,
    taxonomy: &CategoryTaxonomy,
    stats: &ScanStats,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} works from {} files ({} skipped); {} added, {} updated, {} retained",
        catalog.item_count(),
        stats.total_files,
        stats.skipped(),
        stats.added,
        stats.updated,
        stats.retained
    )];
    let counts: Vec<String> = view::item_counts(catalog, taxonomy)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(id, count)| format!("{id} {count}"))
        .collect();
    if !counts.is_empty() {
        lines.push(format!("By category: {}", counts.join(", ")));
    }
    let without_art = catalog
        .items()
        .filter(|item| item.thumbnail.as_ref().is_none_or(|thumb| thumb.is_builtin()))
        .count();
    if without_art > 0 {
        lines.push(format!("{without_art} works show a built-in thumbnail"));
    }
    if stats.captures_started > 0 {
        lines.push(format!(
            "Frame captures: {} started, {} failed",
            stats.captures_started, stats.captures_failed
        ));
    }
    lines
}

#[derive(Debug, Clone)]
struct CliOptions {
    root: PathBuf,
    snapshot: Option<PathBuf>,
    sort: SortOrder,
    category: Option<String>,
    no_capture: bool,
    json: bool,
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut args = args.into_iter();
    match args.next().as_deref() {
        None | Some("-h") | Some("--help") => {
            println!("{}", help_text());
            return Ok(None);
        }
        Some("scan") => {}
        Some(unknown) => return Err(format!("Unknown command: {unknown}\n\n{}", help_text())),
    }

    let args: Vec<String> = args.collect();
    let mut root: Option<PathBuf> = None;
    let mut snapshot = None;
    let mut sort = SortOrder::default();
    let mut category = None;
    let mut no_capture = false;
    let mut json = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--snapshot" => {
                idx += 1;
                let value = required_value(&args, idx, "--snapshot")?;
                snapshot = Some(PathBuf::from(value));
            }
            "--sort" => {
                idx += 1;
                let value = required_value(&args, idx, "--sort")?;
                sort = value.parse().map_err(|err: view::ViewError| err.to_string())?;
            }
            "--category" => {
                idx += 1;
                category = Some(required_value(&args, idx, "--category")?.to_string());
            }
            "--no-capture" => no_capture = true,
            "--json" => json = true,
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown argument: {flag}\n\n{}", help_text()));
            }
            path if root.is_none() => root = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument: {extra}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let Some(root) = root else {
        return Err(format!("scan requires a root directory\n\n{}", help_text()));
    };
    Ok(Some(CliOptions {
        root,
        snapshot,
        sort,
        category,
        no_capture,
        json,
    }))
}

fn required_value<'a>(args: &'a [String], idx: usize, flag: &str) -> Result<&'a str, String> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn help_text() -> String {
    [
        "mediashelf",
        "",
        "Usage:",
        "  mediashelf scan <root> [options]",
        "",
        "Options:",
        "  --snapshot <file>    Snapshot CSV to reconcile against (default: app directory)",
        "  --sort <order>       name | name-desc | newest | oldest (default: name)",
        "  --category <id>      Only show one category (`all` shows everything)",
        "  --no-capture         Skip video frame capture",
        "  --json               Print the catalog and scan stats as JSON",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_scan_options() {
        let options = parse_args(args(&[
            "scan",
            "/library",
            "--sort",
            "newest",
            "--category",
            "DesiredCategory7",
            "--no-capture",
            "--json",
            "--snapshot",
            "/tmp/cache.csv",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(options.root, Path::new("/library"));
        assert_eq!(options.sort, SortOrder::NewestFirst);
        assert_eq!(options.category.as_deref(), Some("DesiredCategory7"));
        assert!(options.no_capture && options.json);
        assert_eq!(options.snapshot, Some(PathBuf::from("/tmp/cache.csv")));
    }

    #[test]
    fn rejects_missing_root_and_bad_values() {
        assert!(parse_args(args(&["scan"])).is_err());
        assert!(parse_args(args(&["scan", "/library", "--sort", "random"])).is_err());
        assert!(parse_args(args(&["scan", "/library", "--snapshot"])).is_err());
        assert!(parse_args(args(&["scan", "/a", "/b"])).is_err());
        assert!(parse_args(args(&["index"])).is_err());
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(args(&["scan", "-h"])).unwrap().is_none());
    }

    #[test]
    fn summary_counts_categories_and_placeholders() {
        use mediashelf::catalog::{Item, ThumbnailRef};

        let taxonomy = CategoryTaxonomy::standard();
        let item = |name: &str, thumbnail: ThumbnailRef| Item {
            name: name.to_string(),
            category: "DesiredCategory2".to_string(),
            group: String::new(),
            full_path: format!("Library/DesiredCategory2/{name}"),
            thumbnail: Some(thumbnail),
            modified_ms: 1,
        };
        let catalog = Catalog::from_items(
            &taxonomy,
            vec![
                item("A", ThumbnailRef::from_stored("/covers/a.png")),
                item("B", ThumbnailRef::default_image()),
            ],
        );
        let stats = ScanStats {
            total_files: 3,
            added: 2,
            ..ScanStats::default()
        };
        let lines = summary_lines(&catalog, &taxonomy, &stats);
        assert_eq!(
            lines,
            vec![
                "2 works from 3 files (0 skipped); 2 added, 0 updated, 0 retained",
                "By category: all 2, DesiredCategory2 2",
                "1 works show a built-in thumbnail",
            ]
        );
    }

    #[test]
    fn describes_labels() {
        let label = mediashelf::catalog::naming::versioned_title("Title 1.02");
        assert_eq!(describe(&label), "Title [1.02]");
        let mut label = mediashelf::catalog::ItemLabel::plain("Work1");
        label.author = Some("Artist".into());
        assert_eq!(describe(&label), "Work1 by Artist");
    }
}
