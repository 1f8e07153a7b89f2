//! Query filtering and category grouping over a flat item collection.
//!
//! Matching is a case-insensitive substring test against the title, the
//! description and the keywords. Results are pass/fail: passing items keep
//! their source order and are never ranked.

use indexmap::IndexMap;
use tracing::trace;

use crate::item::{Category, Item};

/// Group label used when no categories are declared
pub const ALL_GROUP: &str = "All Commands";

/// Group label for items whose category is missing or undeclared
pub const OTHER_GROUP: &str = "Other";

/// Ordered category label -> positions in the projection
pub type Groups = IndexMap<String, Vec<usize>>;

/// Why the projection is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// The source collection itself is empty
    NoItems,
    /// Items exist but the query excluded all of them
    NoMatches,
}

impl EmptyState {
    /// Default user-facing message
    pub fn default_message(&self) -> &'static str {
        match self {
            EmptyState::NoItems => "No commands available",
            EmptyState::NoMatches => "No results found",
        }
    }
}

/// Whether `item` passes the filter for `query`
pub fn matches(item: &Item, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    matches_lowered(item, &query.to_lowercase())
}

fn matches_lowered(item: &Item, query_lower: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(query_lower);

    hit(&item.title)
        || item.description.as_deref().is_some_and(hit)
        || item.keywords.iter().any(|k| hit(k.as_str()))
}

/// Indices (into `items`) of every item passing the filter, in source order
pub fn filter(items: &[Item], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..items.len()).collect();
    }

    let query_lower = query.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches_lowered(item, &query_lower))
        .map(|(idx, _)| idx)
        .collect()
}

/// Partition a projection into display groups.
///
/// Group order follows the first appearance of each label in projection
/// order, not the order of `categories`. Within a group, entries keep
/// projection order.
pub fn group(items: &[Item], projection: &[usize], categories: &[Category]) -> Groups {
    let mut groups = Groups::new();

    if categories.is_empty() {
        if !projection.is_empty() {
            groups.insert(ALL_GROUP.to_string(), (0..projection.len()).collect());
        }
        return groups;
    }

    for (pos, &source_idx) in projection.iter().enumerate() {
        let label = items[source_idx]
            .category
            .as_deref()
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map(|c| c.label.as_str())
            .unwrap_or(OTHER_GROUP);

        groups.entry(label.to_string()).or_default().push(pos);
    }

    groups
}

/// Filtered, grouped view over a caller-supplied item collection.
#[derive(Debug, Clone, Default)]
pub struct SelectableList {
    items: Vec<Item>,
    categories: Vec<Category>,
    query: String,
    /// Source indices of passing items
    projection: Vec<usize>,
}

impl SelectableList {
    /// Create a list with an empty query (everything passes)
    pub fn new(items: Vec<Item>, categories: Vec<Category>) -> Self {
        let projection = (0..items.len()).collect();
        Self {
            items,
            categories,
            query: String::new(),
            projection,
        }
    }

    /// Replace the source collection and recompute the projection
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.recompute();
    }

    /// Replace the declared categories (affects grouping only)
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    /// Replace the query and recompute the projection
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.projection = filter(&self.items, &self.query);
        trace!(
            query = %self.query,
            matched = self.projection.len(),
            total = self.items.len(),
            "projection recomputed"
        );
    }

    /// Current query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Full source collection
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Declared categories
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Source indices of the projection
    pub fn projection_indices(&self) -> &[usize] {
        &self.projection
    }

    /// Passing items in source order
    pub fn projection(&self) -> impl Iterator<Item = &Item> + '_ {
        self.projection.iter().map(move |&idx| &self.items[idx])
    }

    /// Number of passing items
    pub fn len(&self) -> usize {
        self.projection.len()
    }

    /// Whether nothing passes the filter
    pub fn is_empty(&self) -> bool {
        self.projection.is_empty()
    }

    /// Item at a projection position
    pub fn get(&self, pos: usize) -> Option<&Item> {
        self.projection.get(pos).map(|&idx| &self.items[idx])
    }

    /// Display groups over the current projection
    pub fn groups(&self) -> Groups {
        group(&self.items, &self.projection, &self.categories)
    }

    /// Display groups resolved to items
    pub fn grouped_items(&self) -> IndexMap<String, Vec<&Item>> {
        self.groups()
            .into_iter()
            .map(|(label, positions)| {
                let items = positions
                    .into_iter()
                    .filter_map(|pos| self.get(pos))
                    .collect();
                (label, items)
            })
            .collect()
    }

    /// Why the projection is empty, if it is
    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.items.is_empty() {
            Some(EmptyState::NoItems)
        } else if self.projection.is_empty() {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }
}
