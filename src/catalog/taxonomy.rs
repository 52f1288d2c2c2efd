//! Fixed category taxonomy and the per-category behavior it carries.
//!
//! Each category declares its shape (flat or grouped), how item names are
//! parsed for display, which built-in thumbnail it falls back to, and whether
//! video files trigger frame captures. Callers select behavior through the
//! [`Category`] entry instead of comparing category names.

use serde::Serialize;

use super::item::Item;
use super::naming::{self, ItemLabel};
use super::thumbnails::ThumbnailRef;

/// Identifier of the pseudo-category that stands for "every category".
pub const ALL_CATEGORY_ID: &str = "all";

/// Kind of intermediate key used by a two-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Items are grouped by their author.
    Artist,
    /// Items are grouped by a sub-collection folder.
    SubCollection,
}

/// Layout of a category inside the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// `category/item`
    Flat,
    /// `category/group/item`
    Grouped(GroupKind),
}

impl Shape {
    /// Number of path segments (including the category) needed to name an item.
    pub fn min_segments(self) -> usize {
        match self {
            Shape::Flat => 2,
            Shape::Grouped(_) => 3,
        }
    }

    pub fn is_grouped(self) -> bool {
        matches!(self, Shape::Grouped(_))
    }
}

/// Name-parsing strategy used to derive display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStrategy {
    /// `Title 1.02` or `Title (완)`: title plus version.
    VersionedTitle,
    /// The name is the title.
    Plain,
    /// Title is the name, author parsed from the group key.
    AuthorGrouped,
    /// Title is the name; thumbnails fall back to the video placeholder.
    PlaceholderGrouped,
}

/// Built-in image used when no thumbnail candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackThumbnail {
    DefaultImage,
    VideoPlaceholder,
}

/// One real category of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub shape: Shape,
    pub naming: NameStrategy,
    pub fallback: FallbackThumbnail,
    /// Video files start a frame capture when no same-stem image is known.
    pub captures_video: bool,
}

impl Category {
    fn flat(id: &str, naming: NameStrategy) -> Self {
        Self {
            id: id.to_string(),
            shape: Shape::Flat,
            naming,
            fallback: FallbackThumbnail::DefaultImage,
            captures_video: false,
        }
    }

    /// Reference used when an item of this category never found a thumbnail.
    pub fn fallback_thumbnail(&self) -> ThumbnailRef {
        match self.fallback {
            FallbackThumbnail::DefaultImage => ThumbnailRef::default_image(),
            FallbackThumbnail::VideoPlaceholder => ThumbnailRef::video_placeholder(),
        }
    }

    /// Same-stem images outrank every other candidate in this category.
    pub fn prefers_same_stem_image(&self) -> bool {
        self.captures_video
    }

    /// Display label for an item of this category.
    pub fn label(&self, item: &Item) -> ItemLabel {
        match self.naming {
            NameStrategy::VersionedTitle => naming::versioned_title(&item.name),
            NameStrategy::Plain | NameStrategy::PlaceholderGrouped => ItemLabel::plain(&item.name),
            NameStrategy::AuthorGrouped => {
                let mut label = ItemLabel::plain(&item.name);
                label.author = Some(naming::author_name(&item.group));
                label
            }
        }
    }
}

/// Ordered category set with one "all" pseudo-category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTaxonomy {
    all_id: String,
    categories: Vec<Category>,
}

impl CategoryTaxonomy {
    /// The nine-entry taxonomy: `all`, six flat categories, authored works
    /// grouped by artist (`DesiredCategory6`) and videos grouped by
    /// sub-collection (`DesiredCategory7`).
    pub fn standard() -> Self {
        let categories = vec![
            Category::flat("DesiredCategory1", NameStrategy::VersionedTitle),
            Category::flat("DesiredCategory2", NameStrategy::Plain),
            Category::flat("DesiredCategory3", NameStrategy::Plain),
            Category::flat("DesiredCategory4", NameStrategy::Plain),
            Category::flat("DesiredCategory5", NameStrategy::Plain),
            Category {
                id: "DesiredCategory6".to_string(),
                shape: Shape::Grouped(GroupKind::Artist),
                naming: NameStrategy::AuthorGrouped,
                fallback: FallbackThumbnail::DefaultImage,
                captures_video: false,
            },
            Category {
                id: "DesiredCategory7".to_string(),
                shape: Shape::Grouped(GroupKind::SubCollection),
                naming: NameStrategy::PlaceholderGrouped,
                fallback: FallbackThumbnail::VideoPlaceholder,
                captures_video: true,
            },
            Category::flat("DesiredCategory8", NameStrategy::Plain),
        ];
        Self {
            all_id: ALL_CATEGORY_ID.to_string(),
            categories,
        }
    }

    /// Look up a real category; the "all" pseudo-category is not a member.
    pub fn get(&self, id: &str) -> Option<&Category> {
        if id == self.all_id {
            return None;
        }
        self.categories.iter().find(|category| category.id == id)
    }

    /// Real categories in taxonomy order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Every identifier, starting with the "all" pseudo-category.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.all_id.as_str())
            .chain(self.categories.iter().map(|category| category.id.as_str()))
    }

    pub fn all_id(&self) -> &str {
        &self.all_id
    }

    /// Position of a category in taxonomy order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.categories.iter().position(|category| category.id == id)
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_taxonomy_has_nine_ids_and_two_grouped() {
        let taxonomy = CategoryTaxonomy::standard();
        assert_eq!(taxonomy.ids().count(), 9);
        assert_eq!(taxonomy.ids().next(), Some(ALL_CATEGORY_ID));
        let grouped: Vec<_> = taxonomy
            .categories()
            .filter(|category| category.shape.is_grouped())
            .map(|category| category.id.as_str())
            .collect();
        assert_eq!(grouped, vec!["DesiredCategory6", "DesiredCategory7"]);
    }

    #[test]
    fn all_is_not_a_real_category() {
        let taxonomy = CategoryTaxonomy::standard();
        assert!(taxonomy.get(ALL_CATEGORY_ID).is_none());
        assert!(taxonomy.get("DesiredCategory3").is_some());
        assert!(taxonomy.get("Elsewhere").is_none());
    }

    #[test]
    fn only_video_category_captures_frames() {
        let taxonomy = CategoryTaxonomy::standard();
        let capturing: Vec<_> = taxonomy
            .categories()
            .filter(|category| category.captures_video)
            .map(|category| category.id.as_str())
            .collect();
        assert_eq!(capturing, vec!["DesiredCategory7"]);
        let video = taxonomy.get("DesiredCategory7").unwrap();
        assert_eq!(video.fallback_thumbnail(), ThumbnailRef::video_placeholder());
    }
}
