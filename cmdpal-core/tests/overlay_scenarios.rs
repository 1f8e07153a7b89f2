//! End-to-end palette sessions driven through the public API

use cmdpal_core::{
    Category, CloseReason, Disclosure, EmptyState, HoverConfig, HoverIntent, Item, Key,
    ManualClock, Outcome, OverlayController,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn starter_items() -> Vec<Item> {
    vec![
        Item::new("project.new", "Create New Project").in_category("file"),
        Item::new("files.search", "Search Files").in_category("nav"),
        Item::new("theme.toggle", "Toggle Theme")
            .with_keywords(["dark", "light"])
            .in_category("view"),
    ]
}

fn titles(palette: &OverlayController) -> Vec<String> {
    palette
        .view()
        .projection
        .iter()
        .map(|item| item.title.clone())
        .collect()
}

fn type_str(palette: &mut OverlayController, text: &str) {
    for c in text.chars() {
        palette.handle_key(Key::Char(c).into());
    }
}

// === Filtering ===

#[test]
fn test_project_query_matches_title() {
    let mut palette = OverlayController::new(starter_items(), vec![]);
    palette.open();
    type_str(&mut palette, "project");

    assert_eq!(titles(&palette), vec!["Create New Project"]);
}

#[test]
fn test_dark_query_matches_keyword() {
    let mut palette = OverlayController::new(starter_items(), vec![]);
    palette.open();
    type_str(&mut palette, "dark");

    assert_eq!(titles(&palette), vec!["Toggle Theme"]);
}

#[test]
fn test_empty_collection_reports_no_items() {
    let mut palette = OverlayController::new(vec![], vec![]);
    palette.open();
    type_str(&mut palette, "anything");

    let view = palette.view();
    assert!(view.projection.is_empty());
    assert_eq!(view.empty_state, Some(EmptyState::NoItems));
}

#[test]
fn test_query_edit_resets_cursor_from_bottom() {
    let mut palette = OverlayController::new(starter_items(), vec![]);
    palette.open();
    palette.handle_key(Key::Down.into());
    palette.handle_key(Key::Down.into());
    assert_eq!(palette.cursor(), 2);

    palette.set_query("search");
    assert_eq!(titles(&palette), vec!["Search Files"]);
    assert_eq!(palette.cursor(), 0);
}

// === Grouping ===

#[test]
fn test_grouped_view_uses_declared_labels() {
    let categories = vec![
        Category::new("view", "View"),
        Category::new("file", "File"),
    ];
    let mut palette = OverlayController::new(starter_items(), categories);
    palette.open();

    let view = palette.view();
    let labels: Vec<&str> = view.groups.keys().map(String::as_str).collect();
    assert_eq!(labels, vec!["File", "Other", "View"]);
    assert_eq!(view.groups["Other"], vec![1]);
}

// === Full session ===

#[test]
fn test_session_runs_action_then_notifies_close() {
    let events = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&events);
    let mut palette =
        OverlayController::new(starter_items(), vec![]).with_on_close(move |reason| {
            sink.borrow_mut().push(format!("closed:{:?}", reason));
        });

    assert_eq!(palette.set_open(true), Outcome::Updated);
    assert!(palette.take_focus_request());
    type_str(&mut palette, "theme");

    let outcome = palette.handle_key(Key::Enter.into());
    assert_eq!(
        outcome,
        Outcome::Dispatched {
            id: "theme.toggle".to_string()
        }
    );
    assert!(!palette.is_open());
    assert_eq!(*events.borrow(), vec!["closed:Dispatched".to_string()]);

    // Reopening starts a fresh session
    palette.set_open(true);
    assert_eq!(palette.query(), "");
    assert_eq!(titles(&palette).len(), 3);
    assert_eq!(palette.click_backdrop(), Outcome::Closed(CloseReason::Backdrop));
    assert_eq!(events.borrow().len(), 2);
}

// === Hover intent ===

#[test]
fn test_menu_bar_hover_flow() {
    let clock = ManualClock::new();
    let mut hover: HoverIntent<&str, &ManualClock> =
        HoverIntent::with_clock(HoverConfig::default(), &clock);

    assert_eq!(hover.pointer_enter("file", None), vec![Disclosure::Opened("file")]);

    // Pointer crosses the gap between trigger and panel
    hover.pointer_leave(&"file");
    clock.advance(Duration::from_millis(100));
    assert!(hover.poll().is_empty());
    hover.pointer_enter("file", None);
    clock.advance(Duration::from_millis(500));
    assert!(hover.poll().is_empty());
    assert!(hover.is_open(&"file"));

    // Moving to the next menu swaps panels immediately
    let swapped = hover.pointer_enter("edit", None);
    assert_eq!(
        swapped,
        vec![Disclosure::Closed("file"), Disclosure::Opened("edit")]
    );

    hover.pointer_leave(&"edit");
    clock.advance(Duration::from_millis(150));
    assert_eq!(hover.poll(), vec![Disclosure::Closed("edit")]);
    assert_eq!(hover.open_at(None), None);
}
