use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

use serde::Serialize;
use tracing::{debug, warn};

use super::classify::{Classification, SkipReason, classify};
use super::item::{FileEntry, IdentityKey, Item};
use super::shelf::Catalog;
use super::taxonomy::CategoryTaxonomy;
use super::thumbnails::{ThumbnailRank, ThumbnailResolver, ThumbnailSlot};

/// Counters collected while folding entries into a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub classified: usize,
    pub skipped_archive: usize,
    pub skipped_unrecognized: usize,
    pub skipped_shallow: usize,
    pub captures_started: usize,
    pub captures_failed: usize,
}

impl BuildStats {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Archive => self.skipped_archive += 1,
            SkipReason::UnrecognizedCategory => self.skipped_unrecognized += 1,
            SkipReason::Shallow => self.skipped_shallow += 1,
        }
    }
}

struct PendingItem {
    item: Item,
    slot: ThumbnailSlot,
}

/// Folds enumerated files into a [`Catalog`], one item per identity key.
pub struct CatalogBuilder<'a> {
    taxonomy: &'a CategoryTaxonomy,
    root_name: String,
    resolver: ThumbnailResolver,
    pending: Vec<PendingItem>,
    index: HashMap<IdentityKey, usize>,
    stats: BuildStats,
}

impl<'a> CatalogBuilder<'a> {
    /// `root_name` is the final component of the scanned directory and
    /// prefixes every item's full path.
    pub fn new(
        taxonomy: &'a CategoryTaxonomy,
        root_name: impl Into<String>,
        resolver: ThumbnailResolver,
    ) -> Self {
        Self {
            taxonomy,
            root_name: root_name.into(),
            resolver,
            pending: Vec::new(),
            index: HashMap::new(),
            stats: BuildStats::default(),
        }
    }

    /// Classify one file and fold it into its item.
    pub fn accept(&mut self, entry: &FileEntry) -> Classification {
        let taxonomy = self.taxonomy;
        let classification = classify(taxonomy, entry);
        let key = match &classification {
            Classification::Item(key) => key,
            Classification::Ignored(reason) => {
                debug!(file = %entry.source.display(), reason = ?reason, "Skipping entry");
                self.stats.record_skip(*reason);
                return classification;
            }
        };
        let Some(category) = taxonomy.get(&key.category) else {
            return classification;
        };
        self.stats.classified += 1;

        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                let item = Item {
                    name: key.name.clone(),
                    category: key.category.clone(),
                    group: key.group.clone(),
                    full_path: key.full_path(&self.root_name),
                    thumbnail: None,
                    modified_ms: entry.modified_ms,
                };
                self.pending.push(PendingItem {
                    item,
                    slot: ThumbnailSlot::default(),
                });
                self.index.insert(key.clone(), self.pending.len() - 1);
                self.pending.len() - 1
            }
        };
        let pending = &mut self.pending[position];
        pending.item.modified_ms = pending.item.modified_ms.max(entry.modified_ms);
        self.resolver.observe(
            category,
            key,
            &pending.item.full_path,
            entry,
            &mut pending.slot,
        );
        classification
    }

    /// Number of distinct items seen so far.
    pub fn item_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Stop frame captures that have not started yet.
    pub fn abandon(&self) {
        self.resolver.abandon();
    }

    /// Join outstanding captures and materialize the catalog.
    pub fn build(self) -> (Catalog, BuildStats) {
        self.build_or_cancel(None)
    }

    /// Like [`CatalogBuilder::build`], skipping queued captures once `cancel`
    /// is set. The caller decides whether the result is still wanted.
    pub fn build_or_cancel(mut self, cancel: Option<&AtomicBool>) -> (Catalog, BuildStats) {
        self.stats.captures_started = self.resolver.captures_submitted();
        for outcome in self.resolver.finish(cancel) {
            if outcome.failed {
                self.stats.captures_failed += 1;
                continue;
            }
            match self.index.get(&outcome.key) {
                Some(&position) => {
                    self.pending[position]
                        .slot
                        .offer(outcome.thumbnail, ThumbnailRank::CapturedFrame);
                }
                None => warn!(item = ?outcome.key, "Capture finished for unknown item"),
            }
        }

        let taxonomy = self.taxonomy;
        let items = self.pending.into_iter().filter_map(|pending| {
            let category = taxonomy.get(&pending.item.category)?;
            let mut item = pending.item;
            item.thumbnail = Some(pending.slot.resolve(category));
            Some(item)
        });
        (Catalog::from_items(taxonomy, items), self.stats)
    }
}
