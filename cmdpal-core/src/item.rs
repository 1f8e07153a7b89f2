//! Palette entries and the categories used to bucket them for display.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Zero-argument callback bound to an item, invoked when the item is selected.
#[derive(Clone)]
pub struct Action(Arc<dyn Fn() + Send + Sync>);

impl Action {
    /// Wrap a closure as an action
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// An action that does nothing
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Run the callback
    pub fn invoke(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

/// A single selectable/searchable entry.
///
/// Items are supplied by the caller and treated as immutable for the
/// duration of one open overlay session.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique identifier
    pub id: String,
    /// Display title (always searched)
    pub title: String,
    /// Optional description (searched when present)
    pub description: Option<String>,
    /// Category id used for grouping
    pub category: Option<String>,
    /// Extra search terms that never appear in the title
    pub keywords: Vec<String>,
    /// Display ordering hint for hosts that sort their catalog
    pub order: Option<i32>,
    /// Callback run on selection
    pub action: Action,
}

impl Item {
    /// Create an item with a no-op action
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            category: None,
            keywords: Vec::new(),
            order: None,
            action: Action::noop(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Place the item in a category (by category id)
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replace the keyword list
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the display ordering hint
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Bind the selection callback
    pub fn with_action(self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_bound_action(Action::new(f))
    }

    /// Bind an already-constructed action (shared between items)
    pub fn with_bound_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }
}

/// Declared category metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier referenced by `Item::category`
    pub id: String,
    /// Human-readable group heading
    pub label: String,
}

impl Category {
    /// Create a category
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Sort items by their ordering hint, keeping source order for ties and
/// placing unordered items after ordered ones.
pub fn sort_by_order(items: &mut [Item]) {
    items.sort_by_key(|item| (item.order.is_none(), item.order.unwrap_or_default()));
}
