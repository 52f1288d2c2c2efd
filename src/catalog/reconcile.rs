//! Additive merge of a fresh catalog into the prior snapshot.
//!
//! Rows are never removed: items that disappeared from disk keep their prior
//! row until the snapshot file itself is deleted.

use std::collections::HashMap;

use serde::Serialize;

use super::shelf::Catalog;
use super::snapshot::SnapshotRow;
use super::taxonomy::CategoryTaxonomy;

/// How each row of the merged snapshot came about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Fresh items with no prior row.
    pub added: usize,
    /// Fresh items whose modification time changed.
    pub updated: usize,
    /// Fresh items whose prior row was kept as is.
    pub unchanged: usize,
    /// Prior rows with no fresh item.
    pub retained: usize,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Catalog regrouped from `rows`.
    pub catalog: Catalog,
    /// Rows to persist: fresh items in catalog order, then retained rows.
    pub rows: Vec<SnapshotRow>,
    pub report: ReconcileReport,
}

/// Merge `fresh` into `prior`, keeping every prior row.
pub fn reconcile(
    taxonomy: &CategoryTaxonomy,
    fresh: &Catalog,
    prior: Vec<SnapshotRow>,
) -> Reconciliation {
    let by_path: HashMap<&str, usize> = prior
        .iter()
        .enumerate()
        .map(|(index, row)| (row.full_path.as_str(), index))
        .collect();
    let mut matched = vec![false; prior.len()];
    let mut report = ReconcileReport::default();
    let mut rows = Vec::with_capacity(prior.len().max(fresh.item_count()));

    for item in fresh.items() {
        match by_path.get(item.full_path.as_str()) {
            Some(&index) if !matched[index] => {
                matched[index] = true;
                if prior[index].modification_date == item.modified_ms {
                    report.unchanged += 1;
                    rows.push(prior[index].clone());
                } else {
                    report.updated += 1;
                    rows.push(SnapshotRow::from_item(taxonomy, item));
                }
            }
            // Full paths are unique within a catalog.
            Some(_) => {}
            None => {
                report.added += 1;
                rows.push(SnapshotRow::from_item(taxonomy, item));
            }
        }
    }

    for (row, seen) in prior.into_iter().zip(matched) {
        if !seen {
            report.retained += 1;
            rows.push(row);
        }
    }

    let catalog = Catalog::from_items(taxonomy, rows.iter().map(SnapshotRow::to_item));
    Reconciliation {
        catalog,
        rows,
        report,
    }
}
