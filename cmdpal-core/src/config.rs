//! Palette configuration loaded from TOML, with validation and item building.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{PaletteError, Result};
use crate::hover::HoverConfig;
use crate::item::{sort_by_order, Action, Category, Item};
use crate::keymap::{KeyPress, Keymap, OverlayCommand};
use crate::select::EmptyState;

/// Environment variable overriding the config location
pub const CONFIG_ENV: &str = "CMDPAL_CONFIG";

/// Palette configuration loaded from `~/.cmdpal/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub palette: PaletteSection,
    pub hover: HoverSection,

    /// Extra key bindings: `"ctrl+j" = "move_down"`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, OverlayCommand>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSection {
    pub title: String,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_matches_message: Option<String>,
    /// Rows shown before the list scrolls
    pub max_visible: usize,
}

impl Default for PaletteSection {
    fn default() -> Self {
        Self {
            title: "Command Palette".to_string(),
            placeholder: "Type a command or search...".to_string(),
            empty_message: None,
            no_matches_message: None,
            max_visible: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverSection {
    pub close_delay_ms: u64,
    pub open_delay_ms: u64,
}

impl Default for HoverSection {
    fn default() -> Self {
        let defaults = HoverConfig::default();
        Self {
            close_delay_ms: defaults.close_delay.as_millis() as u64,
            open_delay_ms: defaults.open_delay.as_millis() as u64,
        }
    }
}

/// One `[[items]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// Shell command executed on selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    /// Text shown on selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What a configured item does when selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Run(String),
    Message(String),
}

impl ItemConfig {
    /// The configured action, if exactly one of `run`/`message` is set
    pub fn action(&self) -> Option<ItemAction> {
        match (&self.run, &self.message) {
            (Some(cmd), None) => Some(ItemAction::Run(cmd.clone())),
            (None, Some(text)) => Some(ItemAction::Message(text.clone())),
            _ => None,
        }
    }

    /// Build a core item bound to `action`
    pub fn to_item(&self, action: Action) -> Item {
        let mut item = Item::new(&self.id, &self.title)
            .with_keywords(self.keywords.iter().cloned())
            .with_bound_action(action);
        item.description = self.description.clone();
        item.category = self.category.clone();
        item.order = self.order;
        item
    }
}

impl PaletteConfig {
    /// Load config from `$CMDPAL_CONFIG` or `~/.cmdpal/config.toml`
    ///
    /// Fails hard with actionable error if config doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load and validate config from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PaletteError::config_not_found(path));
        }

        let content = fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| PaletteError::toml(path, e))?;
        config.validate()?;

        debug!(
            path = %path.display(),
            items = config.items.len(),
            categories = config.categories.len(),
            "loaded palette config"
        );
        Ok(config)
    }

    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| PaletteError::toml("<inline>", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write config, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Get config file path: `$CMDPAL_CONFIG`, else `~/.cmdpal/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        Self::home_dir().join("config.toml")
    }

    /// `~/.cmdpal`
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cmdpal")
    }

    /// Check ids, titles, actions and key bindings
    pub fn validate(&self) -> Result<()> {
        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id.as_str()) {
                return Err(PaletteError::duplicate_id("category", &category.id));
            }
        }

        let mut item_ids = HashSet::new();
        for item in &self.items {
            if !item_ids.insert(item.id.as_str()) {
                return Err(PaletteError::duplicate_id("item", &item.id));
            }
            if item.title.trim().is_empty() {
                return Err(PaletteError::invalid_item(&item.id, "title is blank"));
            }
            match (&item.run, &item.message) {
                (None, None) => {
                    return Err(PaletteError::invalid_item(
                        &item.id,
                        "needs either `run` or `message`",
                    ))
                }
                (Some(_), Some(_)) => {
                    return Err(PaletteError::invalid_item(
                        &item.id,
                        "set `run` or `message`, not both",
                    ))
                }
                (Some(cmd), None) if cmd.trim().is_empty() => {
                    return Err(PaletteError::invalid_item(&item.id, "`run` is blank"))
                }
                _ => {}
            }
        }

        for binding in self.keys.keys() {
            binding.parse::<KeyPress>()?;
        }

        if self.palette.max_visible == 0 {
            return Err(PaletteError::config("palette.max_visible must be at least 1"));
        }

        Ok(())
    }

    /// Default bindings plus `[keys]` overrides
    pub fn keymap(&self) -> Result<Keymap> {
        let mut keymap = Keymap::default_bindings();
        keymap.apply_overrides(&self.keys)?;
        Ok(keymap)
    }

    /// Hover delays as durations
    pub fn hover_config(&self) -> HoverConfig {
        HoverConfig {
            open_delay: Duration::from_millis(self.hover.open_delay_ms),
            close_delay: Duration::from_millis(self.hover.close_delay_ms),
        }
    }

    /// Message shown for an empty projection
    pub fn empty_message(&self, state: EmptyState) -> &str {
        let configured = match state {
            EmptyState::NoItems => self.palette.empty_message.as_deref(),
            EmptyState::NoMatches => self.palette.no_matches_message.as_deref(),
        };
        configured.unwrap_or_else(|| state.default_message())
    }

    /// Build core items, binding each through `bind`, sorted by `order`
    pub fn build_items<F>(&self, mut bind: F) -> Vec<Item>
    where
        F: FnMut(&ItemConfig) -> Action,
    {
        let mut items: Vec<Item> = self
            .items
            .iter()
            .map(|cfg| cfg.to_item(bind(cfg)))
            .collect();
        sort_by_order(&mut items);
        items
    }
}
