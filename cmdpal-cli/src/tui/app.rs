//! Core application state: menu bar, palette overlay and status line

use std::sync::mpsc::{self, Receiver};

use anyhow::Result;
use cmdpal_core::{
    Clock, CloseReason, Disclosure, HoverIntent, Item, Outcome, OverlayController, PaletteConfig,
    WallClock, OTHER_GROUP,
};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::catalog::{self, Effect};

/// Hover key for the menu holding uncategorized items
pub const OTHER_MENU: &str = "*";

/// Which surface receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Menu bar (palette closed)
    #[default]
    MenuBar,
    /// Palette query input
    Palette,
}

/// One top-level menu: a category and the items filed under it
#[derive(Debug, Clone)]
pub struct Menu {
    /// Hover key (category id, or [`OTHER_MENU`])
    pub key: String,
    /// Trigger label
    pub label: String,
    /// Indices into [`App::items`]
    pub items: Vec<usize>,
}

/// Main application state
pub struct App<C: Clock = WallClock> {
    /// Loaded config (titles, messages, limits)
    pub config: PaletteConfig,
    /// Catalog shared by the palette and the menus
    pub items: Vec<Item>,
    /// Menu bar entries in declared category order
    pub menus: Vec<Menu>,
    /// Palette state machine
    pub palette: OverlayController,
    /// Dropdown disclosure timers, keyed by menu key
    pub hover: HoverIntent<String, C>,
    /// Menu under the pointer (trigger or its open panel)
    pub pointer_over: Option<String>,
    /// Keyboard focus
    pub focus: Focus,
    /// Last drawn frame area, for mouse hit-testing
    pub viewport: Rect,
    /// Status message to display
    pub status_message: Option<String>,
    /// Should quit the application
    pub should_quit: bool,
    effects: Receiver<Effect>,
}

impl App {
    /// Build state from config
    pub fn new(config: PaletteConfig) -> Result<Self> {
        Self::with_clock(config, WallClock)
    }
}

impl<C: Clock> App<C> {
    /// Build state with hover timers on `clock`
    pub fn with_clock(config: PaletteConfig, clock: C) -> Result<Self> {
        let (tx, effects) = mpsc::channel();
        let items = catalog::build_items(&config, &tx);
        let menus = build_menus(&config, &items);

        let palette = OverlayController::new(items.clone(), config.categories.clone())
            .with_keymap(config.keymap()?)
            .with_on_close(move |reason| {
                let _ = tx.send(Effect::PaletteClosed(reason));
            });
        let hover = HoverIntent::with_clock(config.hover_config(), clock);

        Ok(Self {
            config,
            items,
            menus,
            palette,
            hover,
            pointer_over: None,
            focus: Focus::MenuBar,
            viewport: Rect::default(),
            status_message: None,
            should_quit: false,
            effects,
        })
    }

    /// Set a status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    /// Open the palette and move keyboard focus into it
    pub fn open_palette(&mut self) {
        self.close_menus();
        if self.palette.open() == Outcome::Updated && self.palette.take_focus_request() {
            self.focus = Focus::Palette;
        }
    }

    /// Record palette outcomes that need host attention
    pub fn note_outcome(&mut self, outcome: Outcome) {
        if let Outcome::Dispatched { id } = outcome {
            debug!(%id, "palette dispatched");
        }
    }

    // ─── Menus ──────────────────────────────────────────────────────────

    /// Pointer moved onto `target` (a menu trigger or its panel) or off all menus
    pub fn pointer_moved(&mut self, target: Option<String>) {
        if self.pointer_over == target {
            return;
        }
        if let Some(previous) = self.pointer_over.take() {
            self.hover.pointer_leave(&previous);
        }
        if let Some(key) = target.clone() {
            let events = self.hover.pointer_enter(key, None);
            self.apply_disclosures(events);
        }
        self.pointer_over = target;
    }

    /// The open dropdown, if any
    pub fn open_menu(&self) -> Option<&Menu> {
        let key = self.hover.open_at(None)?;
        self.menus.iter().find(|menu| &menu.key == key)
    }

    /// Run a menu entry directly and close its dropdown
    pub fn activate_menu_item(&mut self, menu_idx: usize, row: usize) {
        let Some(menu) = self.menus.get(menu_idx) else {
            return;
        };
        let key = menu.key.clone();
        if let Some(item) = menu.items.get(row).and_then(|&idx| self.items.get(idx)) {
            debug!(id = %item.id, "menu item activated");
            item.action.invoke();
        }
        let events = self.hover.close(&key);
        self.apply_disclosures(events);
        self.pointer_over = None;
    }

    /// Close every dropdown right away
    pub fn close_menus(&mut self) {
        let events = self.hover.close_all();
        self.apply_disclosures(events);
        self.pointer_over = None;
    }

    fn apply_disclosures(&mut self, events: Vec<Disclosure<String>>) {
        for event in events {
            debug!(?event, "menu disclosure");
        }
    }

    // ─── Per-tick work ──────────────────────────────────────────────────

    /// Fire due hover timers and perform queued effects
    pub fn tick(&mut self) {
        let events = self.hover.poll();
        self.apply_disclosures(events);

        let effects: Vec<Effect> = self.effects.try_iter().collect();
        for effect in effects {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Message { id, text } => {
                info!(%id, "message item");
                self.set_status(text);
            }
            Effect::Run { id, command } => {
                info!(%id, %command, "running item");
                match catalog::run_captured(&command) {
                    Ok(output) => self.set_status(catalog::summarize(&command, &output)),
                    Err(err) => {
                        warn!(%id, error = %err, "command failed to start");
                        self.set_status(format!("{}: {:#}", id, err));
                    }
                }
            }
            Effect::PaletteClosed(reason) => {
                self.focus = Focus::MenuBar;
                match reason {
                    CloseReason::Escape | CloseReason::Backdrop => self.set_status("Palette dismissed"),
                    CloseReason::Requested | CloseReason::Dispatched => {}
                }
            }
        }
    }
}

/// Menus in declared category order, plus one for anything uncategorized
fn build_menus(config: &PaletteConfig, items: &[Item]) -> Vec<Menu> {
    let mut menus: Vec<Menu> = config
        .categories
        .iter()
        .map(|category| Menu {
            key: category.id.clone(),
            label: category.label.clone(),
            items: Vec::new(),
        })
        .collect();

    let mut other = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let menu = item
            .category
            .as_deref()
            .and_then(|id| menus.iter_mut().find(|menu| menu.key == id));
        match menu {
            Some(menu) => menu.items.push(idx),
            None => other.push(idx),
        }
    }

    menus.retain(|menu| !menu.items.is_empty());
    if !other.is_empty() {
        menus.push(Menu {
            key: OTHER_MENU.to_string(),
            label: OTHER_GROUP.to_string(),
            items: other,
        });
    }
    menus
}
