//! Event handling for the TUI

use std::time::Duration;

use cmdpal_core::{Key, KeyPress, Modifiers};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use super::app::App;
use super::ui::{self, MenuHit, PaletteHit};

/// Poll for events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// Continue running
    Continue,
    /// Quit the application
    Quit,
}

/// Translate a crossterm key into the palette's key model
pub fn to_key_press(key: &KeyEvent) -> Option<KeyPress> {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    };

    Some(KeyPress {
        key: code,
        modifiers: Modifiers {
            ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
            alt: key.modifiers.contains(KeyModifiers::ALT),
            // Shift is already folded into the character
            shift: key.modifiers.contains(KeyModifiers::SHIFT) && !matches!(code, Key::Char(_)),
        },
    })
}

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> HandleResult {
    if key.kind == KeyEventKind::Release {
        return HandleResult::Continue;
    }

    // Global quit shortcut (Ctrl+C)
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return HandleResult::Quit;
    }

    let Some(press) = to_key_press(&key) else {
        return HandleResult::Continue;
    };

    if app.palette.is_open() {
        let outcome = app.palette.handle_key(press);
        app.note_outcome(outcome);
        return HandleResult::Continue;
    }

    match (press.key, press.modifiers.ctrl) {
        (Key::Char('p'), true) | (Key::Char(':'), false) => {
            app.open_palette();
            HandleResult::Continue
        }
        (Key::Char('q'), false) => HandleResult::Quit,
        (Key::Escape, _) => {
            app.close_menus();
            HandleResult::Continue
        }
        _ => HandleResult::Continue,
    }
}

/// Handle a mouse event
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) -> HandleResult {
    if app.palette.is_open() {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let layout = ui::palette_layout(app);
            let outcome = match ui::palette_hit(&layout, mouse.column, mouse.row) {
                PaletteHit::Item(pos) => app.palette.click_item(pos),
                PaletteHit::Outside => app.palette.click_backdrop(),
                PaletteHit::Inside => return HandleResult::Continue,
            };
            app.note_outcome(outcome);
        }
        return HandleResult::Continue;
    }

    let hit = ui::menu_hit(app, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            let target = hit.and_then(|hit| app.menus.get(hit.menu())).map(|m| m.key.clone());
            app.pointer_moved(target);
        }
        MouseEventKind::Down(MouseButton::Left) => match hit {
            Some(MenuHit::Row(menu, row)) => app.activate_menu_item(menu, row),
            Some(MenuHit::Trigger(menu)) => {
                let target = app.menus.get(menu).map(|m| m.key.clone());
                app.pointer_moved(target);
            }
            Some(MenuHit::Panel(_)) => {}
            None => app.close_menus(),
        },
        _ => {}
    }
    HandleResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdpal_core::PaletteConfig;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let config = PaletteConfig::from_toml_str(
            r#"
[[items]]
id = "one"
title = "First"
message = "1"

[[items]]
id = "two"
title = "Second"
message = "2"
"#,
        )
        .unwrap();
        let mut app = App::new(config).unwrap();
        app.viewport = Rect::new(0, 0, 80, 24);
        app
    }

    #[test]
    fn test_key_translation() {
        let press = to_key_press(&key(KeyCode::Char('n'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(press, KeyPress::ctrl(Key::Char('n')));

        let press = to_key_press(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(press, KeyPress::plain(Key::Char('A')));

        assert!(to_key_press(&key(KeyCode::F(1), KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn test_colon_opens_palette_and_keys_route_to_it() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char(':'), KeyModifiers::NONE));
        assert!(app.palette.is_open());

        // 'q' is query text while the palette is open
        let result = handle_key(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(result, HandleResult::Continue);
        assert_eq!(app.palette.query(), "q");

        handle_key(&mut app, key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.palette.is_open());
        assert_eq!(
            handle_key(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE)),
            HandleResult::Quit
        );
    }

    #[test]
    fn test_enter_dispatches_highlighted() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('p'), KeyModifiers::CONTROL));
        handle_key(&mut app, key(KeyCode::Down, KeyModifiers::NONE));
        handle_key(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));
        app.tick();

        assert!(!app.palette.is_open());
        assert_eq!(app.status_message.as_deref(), Some("2"));
    }

    #[test]
    fn test_backdrop_click_closes() {
        let mut app = app();
        app.open_palette();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 23,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, click);
        assert!(!app.palette.is_open());
    }
}
