//! Terminal host for the palette
//!
//! - Menu bar of categories with hover-intent dropdowns
//! - Command palette overlay (Ctrl+P or `:`)
//! - Status line showing item output

pub mod app;
pub mod event;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use terminal::run;
