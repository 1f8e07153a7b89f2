//! Overlay controller: the open/closed state machine around a
//! [`SelectableList`].
//!
//! The controller owns the query, the cursor and the key table. Every input
//! (key press, click, query edit) is handled synchronously and returns an
//! [`Outcome`] so a host loop can react. While closed, every input is
//! ignored until the overlay is opened again.

use std::fmt;

use tracing::{debug, trace};

use crate::item::{Category, Item};
use crate::keymap::{Key, KeyPress, Keymap, OverlayCommand};
use crate::select::{EmptyState, Groups, SelectableList};

/// Overlay lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

/// Why the overlay closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The host cleared its open flag
    Requested,
    /// Escape (or whatever key is bound to dismiss)
    Escape,
    /// Click outside the content panel
    Backdrop,
    /// An item was dispatched
    Dispatched,
}

/// Result of handling one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Input had no effect (overlay closed, empty projection, unbound key)
    Ignored,
    /// Query, cursor or open state changed; re-render
    Updated,
    /// The item's action ran and the overlay closed
    Dispatched { id: String },
    /// The overlay closed without dispatching
    Closed(CloseReason),
}

/// Read-only snapshot for the presentation layer
#[derive(Debug)]
pub struct PaletteView<'a> {
    /// Current query text
    pub query: &'a str,
    /// Highlighted projection position
    pub cursor: usize,
    /// Passing items in source order
    pub projection: Vec<&'a Item>,
    /// Display groups (label -> projection positions)
    pub groups: Groups,
    /// Set when the projection is empty
    pub empty_state: Option<EmptyState>,
}

type CloseCallback = Box<dyn FnMut(CloseReason)>;

/// Searchable, keyboard-navigable selection overlay.
pub struct OverlayController {
    list: SelectableList,
    keymap: Keymap,
    state: OverlayState,
    cursor: usize,
    focus_requested: bool,
    on_close: Option<CloseCallback>,
}

impl fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayController")
            .field("state", &self.state)
            .field("query", &self.list.query())
            .field("cursor", &self.cursor)
            .field("matched", &self.list.len())
            .field("total", &self.list.items().len())
            .finish()
    }
}

impl OverlayController {
    /// Closed overlay over `items` with the default key table
    pub fn new(items: Vec<Item>, categories: Vec<Category>) -> Self {
        Self {
            list: SelectableList::new(items, categories),
            keymap: Keymap::default_bindings(),
            state: OverlayState::Closed,
            cursor: 0,
            focus_requested: false,
            on_close: None,
        }
    }

    /// Replace the key table
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Register the close notification
    pub fn with_on_close(mut self, callback: impl FnMut(CloseReason) + 'static) -> Self {
        self.set_on_close(callback);
        self
    }

    /// Register (or replace) the close notification
    pub fn set_on_close(&mut self, callback: impl FnMut(CloseReason) + 'static) {
        self.on_close = Some(Box::new(callback));
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────

    /// Mirror the host's open flag
    pub fn set_open(&mut self, open: bool) -> Outcome {
        if open {
            self.open()
        } else {
            self.close()
        }
    }

    /// Closed -> Open: query and cursor reset, focus requested
    pub fn open(&mut self) -> Outcome {
        if self.is_open() {
            return Outcome::Ignored;
        }
        self.state = OverlayState::Open;
        self.list.set_query(String::new());
        self.cursor = 0;
        self.focus_requested = true;
        debug!(items = self.list.items().len(), "overlay opened");
        Outcome::Updated
    }

    /// Explicit close from the host
    pub fn close(&mut self) -> Outcome {
        self.close_with(CloseReason::Requested)
    }

    /// Pointer click outside the content panel
    pub fn click_backdrop(&mut self) -> Outcome {
        self.close_with(CloseReason::Backdrop)
    }

    fn close_with(&mut self, reason: CloseReason) -> Outcome {
        if !self.is_open() {
            return Outcome::Ignored;
        }
        self.transition_closed(reason);
        Outcome::Closed(reason)
    }

    fn transition_closed(&mut self, reason: CloseReason) {
        self.state = OverlayState::Closed;
        self.focus_requested = false;
        debug!(?reason, "overlay closed");
        if let Some(callback) = self.on_close.as_mut() {
            callback(reason);
        }
    }

    // ─── Query ──────────────────────────────────────────────────────────

    /// Replace the query; the cursor returns to the top result
    pub fn set_query(&mut self, query: impl Into<String>) -> Outcome {
        if !self.is_open() {
            return Outcome::Ignored;
        }
        self.list.set_query(query);
        self.cursor = 0;
        Outcome::Updated
    }

    /// Append one character to the query
    pub fn insert_char(&mut self, c: char) -> Outcome {
        let mut query = self.list.query().to_string();
        query.push(c);
        self.set_query(query)
    }

    /// Remove the last query character
    pub fn backspace(&mut self) -> Outcome {
        if self.list.query().is_empty() {
            return Outcome::Ignored;
        }
        let mut query = self.list.query().to_string();
        query.pop();
        self.set_query(query)
    }

    /// Empty the query
    pub fn clear_query(&mut self) -> Outcome {
        if self.list.query().is_empty() {
            return Outcome::Ignored;
        }
        self.set_query(String::new())
    }

    // ─── Cursor ─────────────────────────────────────────────────────────

    fn move_to(&mut self, target: usize) -> Outcome {
        if !self.is_open() || self.list.is_empty() {
            return Outcome::Ignored;
        }
        let clamped = target.min(self.list.len() - 1);
        if clamped == self.cursor {
            return Outcome::Ignored;
        }
        trace!(from = self.cursor, to = clamped, "cursor moved");
        self.cursor = clamped;
        Outcome::Updated
    }

    /// One entry down, stopping at the last entry
    pub fn move_down(&mut self) -> Outcome {
        self.move_to(self.cursor.saturating_add(1))
    }

    /// One entry up, stopping at the first entry
    pub fn move_up(&mut self) -> Outcome {
        self.move_to(self.cursor.saturating_sub(1))
    }

    /// Jump to the first entry
    pub fn move_first(&mut self) -> Outcome {
        self.move_to(0)
    }

    /// Jump to the last entry
    pub fn move_last(&mut self) -> Outcome {
        self.move_to(usize::MAX)
    }

    // ─── Dispatch ───────────────────────────────────────────────────────

    /// Enter: run the highlighted entry's action, then close
    pub fn dispatch_highlighted(&mut self) -> Outcome {
        self.dispatch_at(self.cursor)
    }

    /// Click on an entry: run its action, then close. The cursor does not
    /// have to be on it.
    pub fn click_item(&mut self, pos: usize) -> Outcome {
        self.dispatch_at(pos)
    }

    fn dispatch_at(&mut self, pos: usize) -> Outcome {
        if !self.is_open() {
            return Outcome::Ignored;
        }
        let Some(item) = self.list.get(pos) else {
            return Outcome::Ignored;
        };
        let id = item.id.clone();
        let action = item.action.clone();

        debug!(%id, pos, "dispatching item");
        action.invoke();
        self.transition_closed(CloseReason::Dispatched);
        Outcome::Dispatched { id }
    }

    // ─── Keyboard routing ───────────────────────────────────────────────

    /// Route a key press through the key table. Unbound printable characters
    /// (without Ctrl/Alt) edit the query.
    pub fn handle_key(&mut self, press: KeyPress) -> Outcome {
        if !self.is_open() {
            return Outcome::Ignored;
        }

        if let Some(command) = self.keymap.resolve(&press) {
            return self.execute(command);
        }

        match press.key {
            Key::Char(c) if !press.modifiers.ctrl && !press.modifiers.alt => self.insert_char(c),
            _ => Outcome::Ignored,
        }
    }

    /// Run a resolved command
    pub fn execute(&mut self, command: OverlayCommand) -> Outcome {
        match command {
            OverlayCommand::MoveDown => self.move_down(),
            OverlayCommand::MoveUp => self.move_up(),
            OverlayCommand::MoveFirst => self.move_first(),
            OverlayCommand::MoveLast => self.move_last(),
            OverlayCommand::Dispatch => self.dispatch_highlighted(),
            OverlayCommand::Dismiss => self.close_with(CloseReason::Escape),
            OverlayCommand::DeleteChar => self.backspace(),
            OverlayCommand::ClearQuery => self.clear_query(),
        }
    }

    // ─── Source collection ──────────────────────────────────────────────

    /// Replace the source collection (normally between sessions). The
    /// cursor is clamped into the new projection.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.list.set_items(items);
        self.cursor = self.cursor.min(self.list.len().saturating_sub(1));
    }

    /// Replace the declared categories
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.list.set_categories(categories);
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    /// Current state
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Whether the overlay is open
    pub fn is_open(&self) -> bool {
        self.state == OverlayState::Open
    }

    /// Current query
    pub fn query(&self) -> &str {
        self.list.query()
    }

    /// Highlighted projection position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Highlighted item, if the projection is non-empty
    pub fn highlighted(&self) -> Option<&Item> {
        self.list.get(self.cursor)
    }

    /// Underlying filtered list
    pub fn list(&self) -> &SelectableList {
        &self.list
    }

    /// Key table, for host-side rebinding
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Whether the host still has to move focus into the query input
    pub fn focus_requested(&self) -> bool {
        self.focus_requested
    }

    /// Consume the focus request raised when the overlay opened
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Snapshot for rendering
    pub fn view(&self) -> PaletteView<'_> {
        PaletteView {
            query: self.list.query(),
            cursor: self.cursor,
            projection: self.list.projection().collect(),
            groups: self.list.groups(),
            empty_state: self.list.empty_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn logged_item(log: &Log, id: &str, title: &str) -> Item {
        let log = Arc::clone(log);
        let tag = format!("action:{}", id);
        Item::new(id, title).with_action(move || log.lock().unwrap().push(tag.clone()))
    }

    fn controller(log: &Log) -> OverlayController {
        let items = vec![
            logged_item(log, "project.new", "Create New Project"),
            logged_item(log, "files.search", "Search Files"),
            logged_item(log, "theme.toggle", "Toggle Theme").with_keywords(["dark"]),
        ];
        let close_log = Arc::clone(log);
        OverlayController::new(items, vec![]).with_on_close(move |reason| {
            close_log.lock().unwrap().push(format!("close:{:?}", reason));
        })
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_starts_closed_and_ignores_input() {
        let log = Log::default();
        let mut palette = controller(&log);

        assert_eq!(palette.state(), OverlayState::Closed);
        assert_eq!(palette.handle_key(Key::Enter.into()), Outcome::Ignored);
        assert_eq!(palette.click_item(0), Outcome::Ignored);
        assert_eq!(palette.set_query("x"), Outcome::Ignored);
        assert_eq!(palette.click_backdrop(), Outcome::Ignored);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_open_resets_query_and_cursor() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        palette.set_query("e");
        palette.move_down();
        palette.close();

        assert_eq!(palette.open(), Outcome::Updated);
        assert_eq!(palette.query(), "");
        assert_eq!(palette.cursor(), 0);
        assert!(palette.take_focus_request());
        assert!(!palette.take_focus_request());
    }

    #[test]
    fn test_arrow_keys_clamp_without_wrap() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();

        assert_eq!(palette.handle_key(Key::Up.into()), Outcome::Ignored);
        assert_eq!(palette.cursor(), 0);
        palette.handle_key(Key::Down.into());
        palette.handle_key(Key::Down.into());
        assert_eq!(palette.cursor(), 2);
        assert_eq!(palette.handle_key(Key::Down.into()), Outcome::Ignored);
        assert_eq!(palette.cursor(), 2);
        palette.handle_key(Key::Up.into());
        assert_eq!(palette.cursor(), 1);
    }

    #[test]
    fn test_typing_resets_cursor() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        palette.move_last();
        assert_eq!(palette.cursor(), 2);

        palette.handle_key(Key::Char('t').into());
        assert_eq!(palette.query(), "t");
        assert_eq!(palette.cursor(), 0);
    }

    #[test]
    fn test_enter_dispatches_once_then_closes() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        palette.move_down();

        let outcome = palette.handle_key(Key::Enter.into());
        assert_eq!(
            outcome,
            Outcome::Dispatched {
                id: "files.search".to_string()
            }
        );
        assert_eq!(palette.handle_key(Key::Enter.into()), Outcome::Ignored);
        assert_eq!(
            entries(&log),
            vec!["action:files.search", "close:Dispatched"]
        );
    }

    #[test]
    fn test_enter_on_empty_projection_stays_open() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        palette.set_query("zzz");

        assert_eq!(palette.handle_key(Key::Enter.into()), Outcome::Ignored);
        assert!(palette.is_open());
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_click_dispatches_without_moving_cursor() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();

        assert_eq!(
            palette.click_item(2),
            Outcome::Dispatched {
                id: "theme.toggle".to_string()
            }
        );
        assert_eq!(entries(&log), vec!["action:theme.toggle", "close:Dispatched"]);
    }

    #[test]
    fn test_click_out_of_range_is_noop() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        assert_eq!(palette.click_item(7), Outcome::Ignored);
        assert!(palette.is_open());
    }

    #[test]
    fn test_every_close_path_notifies_once() {
        let log = Log::default();
        let mut palette = controller(&log);

        palette.open();
        assert_eq!(
            palette.handle_key(Key::Escape.into()),
            Outcome::Closed(CloseReason::Escape)
        );
        palette.open();
        assert_eq!(palette.click_backdrop(), Outcome::Closed(CloseReason::Backdrop));
        palette.open();
        assert_eq!(
            palette.set_open(false),
            Outcome::Closed(CloseReason::Requested)
        );
        assert_eq!(palette.set_open(false), Outcome::Ignored);

        assert_eq!(
            entries(&log),
            vec!["close:Escape", "close:Backdrop", "close:Requested"]
        );
    }

    #[test]
    fn test_ctrl_chars_do_not_edit_query() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();

        assert_eq!(palette.handle_key(KeyPress::ctrl(Key::Char('x'))), Outcome::Ignored);
        assert_eq!(palette.query(), "");
        palette.handle_key(KeyPress::ctrl(Key::Char('n')));
        assert_eq!(palette.cursor(), 1);
    }

    #[test]
    fn test_backspace_and_clear() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        for c in "dar".chars() {
            palette.handle_key(Key::Char(c).into());
        }
        palette.handle_key(Key::Backspace.into());
        assert_eq!(palette.query(), "da");
        palette.handle_key(KeyPress::ctrl(Key::Char('u')));
        assert_eq!(palette.query(), "");
        assert_eq!(palette.handle_key(Key::Backspace.into()), Outcome::Ignored);
    }

    #[test]
    fn test_view_model() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        palette.set_query("dark");

        let view = palette.view();
        assert_eq!(view.query, "dark");
        assert_eq!(view.cursor, 0);
        assert_eq!(view.projection.len(), 1);
        assert_eq!(view.projection[0].id, "theme.toggle");
        assert_eq!(view.groups.len(), 1);
        assert!(view.empty_state.is_none());
    }

    #[test]
    fn test_set_items_clamps_cursor() {
        let log = Log::default();
        let mut palette = controller(&log);
        palette.open();
        palette.move_last();
        palette.set_items(vec![Item::new("only", "Only One")]);
        assert_eq!(palette.cursor(), 0);
        assert_eq!(palette.highlighted().map(|i| i.id.as_str()), Some("only"));
    }

    #[test]
    fn test_close_callback_may_borrow_host_state() {
        let closed = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&closed);
        let mut palette = OverlayController::new(vec![Item::new("a", "A")], vec![])
            .with_on_close(move |_| *counter.borrow_mut() += 1);

        palette.open();
        palette.dispatch_highlighted();
        palette.dispatch_highlighted();
        assert_eq!(*closed.borrow(), 1);
    }
}
