//! Filtered and sorted projections of a catalog for display.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::item::Item;
use super::shelf::{Catalog, CategoryShelf};
use super::taxonomy::CategoryTaxonomy;

/// Which categories a view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Resolve a category id; the "all" pseudo-category selects everything.
    pub fn from_id(taxonomy: &CategoryTaxonomy, id: &str) -> Result<Self, ViewError> {
        if id == taxonomy.all_id() {
            return Ok(Self::All);
        }
        match taxonomy.get(id) {
            Some(category) => Ok(Self::Only(category.id.clone())),
            None => Err(ViewError::UnknownCategory(id.to_string())),
        }
    }

    pub fn includes(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => id == category,
        }
    }
}

/// Order of items within each flat list or group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            Self::NameAsc => compare_names(a, b),
            Self::NameDesc => compare_names(b, a),
            Self::NewestFirst => b
                .modified_ms
                .cmp(&a.modified_ms)
                .then_with(|| compare_names(a, b)),
            Self::OldestFirst => a
                .modified_ms
                .cmp(&b.modified_ms)
                .then_with(|| compare_names(a, b)),
        }
    }

    pub fn sort(self, items: &mut [Item]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

fn compare_names(a: &Item, b: &Item) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

impl FromStr for SortOrder {
    type Err = ViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            "newest" => Ok(Self::NewestFirst),
            "oldest" => Ok(Self::OldestFirst),
            other => Err(ViewError::UnknownSortOrder(other.to_string())),
        }
    }
}

/// Errors raised while parsing view options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Unknown sort order: {0} (expected name, name-desc, newest or oldest)")]
    UnknownSortOrder(String),
}

/// Copy of `catalog` restricted by `filter`, shelves in taxonomy order and
/// items sorted by `order`. Groups keep their first-sighting order.
pub fn apply(
    catalog: &Catalog,
    taxonomy: &CategoryTaxonomy,
    filter: &CategoryFilter,
    order: SortOrder,
) -> Catalog {
    let mut shelves: Vec<CategoryShelf> = catalog
        .shelves()
        .filter(|entry| filter.includes(&entry.category))
        .cloned()
        .collect();
    shelves.sort_by_key(|entry| taxonomy.position(&entry.category).unwrap_or(usize::MAX));
    for entry in &mut shelves {
        for items in entry.shelf.lists_mut() {
            order.sort(items);
        }
    }
    Catalog::from_shelves(shelves)
}

/// Item count per category id, starting with the "all" total.
pub fn item_counts(catalog: &Catalog, taxonomy: &CategoryTaxonomy) -> Vec<(String, usize)> {
    let mut counts = vec![(taxonomy.all_id().to_string(), catalog.item_count())];
    counts.extend(taxonomy.categories().map(|category| {
        let count = catalog.shelf(&category.id).map(|shelf| shelf.len()).unwrap_or(0);
        (category.id.clone(), count)
    }));
    counts
}
