pub mod clock;
pub mod config;
pub mod error;
pub mod hover;
pub mod item;
pub mod keymap;
pub mod overlay;
pub mod select;

pub use clock::{Clock, ManualClock, WallClock};
pub use config::{ItemAction, ItemConfig, PaletteConfig};
pub use error::{PaletteError, Result};
pub use hover::{Disclosure, HoverConfig, HoverIntent, DEFAULT_CLOSE_DELAY};
pub use item::{sort_by_order, Action, Category, Item};
pub use keymap::{Key, KeyPress, Keymap, Modifiers, OverlayCommand};
pub use overlay::{CloseReason, OverlayController, OverlayState, Outcome, PaletteView};
pub use select::{filter, group, matches, EmptyState, Groups, SelectableList, ALL_GROUP, OTHER_GROUP};
