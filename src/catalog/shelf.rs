//! Nested catalog structure: category, optional group, items.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::item::{IdentityKey, Item};
use super::taxonomy::{CategoryTaxonomy, Shape};

/// Items of one group inside a two-level category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub key: String,
    pub items: Vec<Item>,
}

/// Contents of one category, shaped by the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "shape", content = "entries")]
pub enum Shelf {
    Flat(Vec<Item>),
    Grouped(Vec<Group>),
}

impl Shelf {
    fn empty(shape: Shape) -> Self {
        match shape {
            Shape::Flat => Shelf::Flat(Vec::new()),
            Shape::Grouped(_) => Shelf::Grouped(Vec::new()),
        }
    }

    fn push(&mut self, item: Item) {
        match self {
            Shelf::Flat(items) => items.push(item),
            Shelf::Grouped(groups) => {
                match groups.iter_mut().find(|group| group.key == item.group) {
                    Some(group) => group.items.push(item),
                    None => groups.push(Group {
                        key: item.group.clone(),
                        items: vec![item],
                    }),
                }
            }
        }
    }

    /// Items in display order.
    pub fn items(&self) -> Box<dyn Iterator<Item = &Item> + '_> {
        match self {
            Shelf::Flat(items) => Box::new(items.iter()),
            Shelf::Grouped(groups) => Box::new(groups.iter().flat_map(|group| group.items.iter())),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Shelf::Flat(items) => items.len(),
            Shelf::Grouped(groups) => groups.iter().map(|group| group.items.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutable access to every ordered item list (one per group when grouped).
    pub(crate) fn lists_mut(&mut self) -> Vec<&mut Vec<Item>> {
        match self {
            Shelf::Flat(items) => vec![items],
            Shelf::Grouped(groups) => groups.iter_mut().map(|group| &mut group.items).collect(),
        }
    }
}

/// One category and its shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShelf {
    pub category: String,
    pub shelf: Shelf,
}

/// Catalog of every category seen in a scan, in order of first sighting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    shelves: Vec<CategoryShelf>,
}

impl Catalog {
    /// Group `items` by category and group, keeping first-sighting order.
    ///
    /// Items whose category is not part of the taxonomy are left out, and a
    /// flat category never receives a group, so every item ends up under the
    /// key it carries.
    pub fn from_items(taxonomy: &CategoryTaxonomy, items: impl IntoIterator<Item = Item>) -> Self {
        let mut shelves: Vec<CategoryShelf> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for mut item in items {
            let Some(category) = taxonomy.get(&item.category) else {
                debug!(
                    item = %item.full_path,
                    category = %item.category,
                    "Skipping item of unknown category"
                );
                continue;
            };
            if category.shape == Shape::Flat {
                item.group.clear();
            }
            let index = *positions.entry(item.category.clone()).or_insert_with(|| {
                shelves.push(CategoryShelf {
                    category: item.category.clone(),
                    shelf: Shelf::empty(category.shape),
                });
                shelves.len() - 1
            });
            shelves[index].shelf.push(item);
        }
        Self { shelves }
    }

    pub(crate) fn from_shelves(shelves: Vec<CategoryShelf>) -> Self {
        Self { shelves }
    }

    pub fn shelves(&self) -> impl Iterator<Item = &CategoryShelf> {
        self.shelves.iter()
    }

    pub fn shelf(&self, category: &str) -> Option<&Shelf> {
        self.shelves
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| &entry.shelf)
    }

    /// Every item, category by category.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.shelves.iter().flat_map(|entry| entry.shelf.items())
    }

    /// Number of registered works.
    pub fn item_count(&self) -> usize {
        self.shelves.iter().map(|entry| entry.shelf.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn find(&self, key: &IdentityKey) -> Option<&Item> {
        self.shelf(&key.category)?
            .items()
            .find(|item| item.group == key.group && item.name == key.name)
    }
}
