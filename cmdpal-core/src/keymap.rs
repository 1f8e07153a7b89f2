//! Key-to-command table owned by the overlay controller.
//!
//! Keys are a headless abstraction so the controller can be driven without a
//! terminal or a focused widget. Hosts translate their native key events into
//! [`KeyPress`] and hand them to the controller.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PaletteError, Result};

/// A key, independent of any terminal or windowing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Modifier flags held with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
    };
}

/// A key with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Key without modifiers
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Key with Ctrl held
    pub const fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }
}

impl From<Key> for KeyPress {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

impl FromStr for KeyPress {
    type Err = PaletteError;

    /// Parse bindings such as `"down"`, `"esc"`, `"ctrl+n"`, `"alt+shift+k"`
    fn from_str(s: &str) -> Result<Self> {
        let mut modifiers = Modifiers::NONE;
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();

        let key_part = match parts.pop() {
            Some(part) if !part.is_empty() => part,
            _ => return Err(PaletteError::invalid_key(s, "missing key")),
        };

        for part in parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "meta" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                other => {
                    return Err(PaletteError::invalid_key(
                        s,
                        format!("unknown modifier '{}'", other),
                    ))
                }
            }
        }

        let key = match key_part.to_lowercase().as_str() {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = key_part.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => {
                        return Err(PaletteError::invalid_key(
                            s,
                            format!("unknown key '{}'", key_part),
                        ))
                    }
                }
            }
        };

        Ok(Self { key, modifiers })
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "shift+")?;
        }
        match self.key {
            Key::Char(' ') => write!(f, "space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Up => write!(f, "up"),
            Key::Down => write!(f, "down"),
            Key::Left => write!(f, "left"),
            Key::Right => write!(f, "right"),
            Key::Enter => write!(f, "enter"),
            Key::Escape => write!(f, "esc"),
            Key::Backspace => write!(f, "backspace"),
            Key::Tab => write!(f, "tab"),
            Key::Home => write!(f, "home"),
            Key::End => write!(f, "end"),
            Key::PageUp => write!(f, "pageup"),
            Key::PageDown => write!(f, "pagedown"),
        }
    }
}

/// What a key does inside an open overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCommand {
    /// Move the cursor one entry down (clamped)
    MoveDown,
    /// Move the cursor one entry up (clamped)
    MoveUp,
    /// Jump to the first entry
    MoveFirst,
    /// Jump to the last entry
    MoveLast,
    /// Dispatch the highlighted entry
    Dispatch,
    /// Close without dispatching
    Dismiss,
    /// Delete the last query character
    DeleteChar,
    /// Clear the query
    ClearQuery,
}

/// Key table resolving presses to overlay commands.
///
/// Unbound printable characters are treated as query input by the
/// controller, so only navigation and control keys live here.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyPress, OverlayCommand>,
}

impl Keymap {
    /// Arrow keys, Enter, Escape and Backspace, plus a few Ctrl chords
    pub fn default_bindings() -> Self {
        let mut bindings = HashMap::new();

        bindings.insert(KeyPress::plain(Key::Down), OverlayCommand::MoveDown);
        bindings.insert(KeyPress::plain(Key::Up), OverlayCommand::MoveUp);
        bindings.insert(KeyPress::plain(Key::Home), OverlayCommand::MoveFirst);
        bindings.insert(KeyPress::plain(Key::End), OverlayCommand::MoveLast);
        bindings.insert(KeyPress::plain(Key::Enter), OverlayCommand::Dispatch);
        bindings.insert(KeyPress::plain(Key::Escape), OverlayCommand::Dismiss);
        bindings.insert(KeyPress::plain(Key::Backspace), OverlayCommand::DeleteChar);

        bindings.insert(KeyPress::ctrl(Key::Char('n')), OverlayCommand::MoveDown);
        bindings.insert(KeyPress::ctrl(Key::Char('p')), OverlayCommand::MoveUp);
        bindings.insert(KeyPress::ctrl(Key::Char('u')), OverlayCommand::ClearQuery);

        Self { bindings }
    }

    /// A table with no bindings at all
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Resolve a key press
    pub fn resolve(&self, press: &KeyPress) -> Option<OverlayCommand> {
        self.bindings.get(press).copied()
    }

    /// Add or override a binding
    pub fn bind(&mut self, press: KeyPress, command: OverlayCommand) {
        self.bindings.insert(press, command);
    }

    /// Remove a binding
    pub fn unbind(&mut self, press: &KeyPress) {
        self.bindings.remove(press);
    }

    /// Apply `"key" = "command"` overrides, e.g. from config
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a OverlayCommand)>,
    {
        for (binding, command) in overrides {
            let press: KeyPress = binding.parse()?;
            self.bind(press, *command);
        }
        Ok(())
    }

    /// Number of active bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::default_bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default_bindings();
        assert_eq!(
            keymap.resolve(&KeyPress::plain(Key::Down)),
            Some(OverlayCommand::MoveDown)
        );
        assert_eq!(
            keymap.resolve(&KeyPress::plain(Key::Escape)),
            Some(OverlayCommand::Dismiss)
        );
        assert_eq!(keymap.resolve(&KeyPress::plain(Key::Char('j'))), None);
    }

    #[test]
    fn test_parse_key_press() {
        assert_eq!("down".parse::<KeyPress>().unwrap(), KeyPress::plain(Key::Down));
        assert_eq!(
            "Ctrl+j".parse::<KeyPress>().unwrap(),
            KeyPress::ctrl(Key::Char('j'))
        );
        let press: KeyPress = "alt+shift+k".parse().unwrap();
        assert!(press.modifiers.alt && press.modifiers.shift && !press.modifiers.ctrl);
        assert_eq!(press.key, Key::Char('k'));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("hyper+x".parse::<KeyPress>().is_err());
        assert!("ctrl+".parse::<KeyPress>().is_err());
        assert!("nope".parse::<KeyPress>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for text in ["ctrl+n", "esc", "space", "alt+pagedown"] {
            let press: KeyPress = text.parse().unwrap();
            assert_eq!(press.to_string(), text);
        }
    }

    #[test]
    fn test_overrides() {
        let mut keymap = Keymap::default_bindings();
        let overrides: HashMap<String, OverlayCommand> = [
            ("ctrl+j".to_string(), OverlayCommand::MoveDown),
            ("tab".to_string(), OverlayCommand::Dispatch),
        ]
        .into_iter()
        .collect();

        keymap.apply_overrides(&overrides).unwrap();
        assert_eq!(
            keymap.resolve(&KeyPress::ctrl(Key::Char('j'))),
            Some(OverlayCommand::MoveDown)
        );
        assert_eq!(
            keymap.resolve(&KeyPress::plain(Key::Tab)),
            Some(OverlayCommand::Dispatch)
        );

        keymap.unbind(&KeyPress::plain(Key::Tab));
        assert_eq!(keymap.resolve(&KeyPress::plain(Key::Tab)), None);
    }
}
