use std::fmt;

use serde::{Deserialize, Serialize};

/// Modifier keys held during a key press or pointer click.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, alt: false, shift: false, logo: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true, alt: false, shift: false, logo: false };
    pub const ALT: Modifiers = Modifiers { ctrl: false, alt: true, shift: false, logo: false };
    pub const CTRL_SHIFT: Modifiers = Modifiers { ctrl: true, alt: false, shift: true, logo: false };

    pub fn is_empty(&self) -> bool {
        *self == Modifiers::NONE
    }
}

/// A key, independent of keyboard layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letters are stored upper-case.
    Char(char),
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Escape,
    Tab,
    Enter,
    Space,
    Plus,
    Minus,
    Equal,
    Delete,
    Backspace,
    F(u8),
}

impl Key {
    /// Parses a key name as written in binding strings (`"T"`, `"Left"`, `"F5"`).
    pub fn parse(name: &str) -> Option<Key> {
        let key = match name {
            "Left" => Key::Left,
            "Right" => Key::Right,
            "Up" => Key::Up,
            "Down" => Key::Down,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            "Enter" | "Return" => Key::Enter,
            "Space" => Key::Space,
            "Plus" => Key::Plus,
            "Minus" => Key::Minus,
            "Equal" => Key::Equal,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            _ => {
                if let Some(n) = name.strip_prefix('F') {
                    if let Ok(n) = n.parse::<u8>() {
                        return (1..=24).contains(&n).then_some(Key::F(n));
                    }
                }
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::from_char(c)?,
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Option<Key> {
        match key {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            " " => Some(Key::Space),
            other => Key::parse(other),
        }
    }

    fn from_char(c: char) -> Option<Key> {
        match c {
            '+' => Some(Key::Plus),
            '-' => Some(Key::Minus),
            '=' => Some(Key::Equal),
            ' ' => Some(Key::Space),
            c if c.is_control() => None,
            c => Some(Key::Char(c.to_ascii_uppercase())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A key plus the exact set of modifiers held with it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parses `"Ctrl+Shift+T"` style strings. Modifier names are case-insensitive.
    pub fn parse(chord: &str) -> Option<KeyChord> {
        let chord = chord.trim();
        if chord.is_empty() {
            return None;
        }
        let parts: Vec<&str> = chord.split('+').collect();
        let (key_name, modifier_names) = parts.split_last()?;
        let mut modifiers = Modifiers::NONE;
        for name in modifier_names {
            match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "super" | "meta" | "logo" | "cmd" => modifiers.logo = true,
                _ => return None,
            }
        }
        let key = Key::parse(key_name)?;
        Some(KeyChord { key, modifiers })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        if self.modifiers.logo {
            write!(f, "Super+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Widget focus context a chord is delivered in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FocusScope {
    Window,
    LocationBar,
    WebView,
    TabBox,
}

/// Pointer buttons, numbered the way the toolkit numbers them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u32),
}

impl PointerButton {
    pub fn from_number(n: u32) -> Self {
        match n {
            1 => PointerButton::Primary,
            2 => PointerButton::Middle,
            3 => PointerButton::Secondary,
            other => PointerButton::Other(other),
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            PointerButton::Primary => 1,
            PointerButton::Middle => 2,
            PointerButton::Secondary => 3,
            PointerButton::Other(n) => *n,
        }
    }
}

/// Everything a keybinding can trigger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    NewTab,
    CloseTab,
    FocusLocation,
    FocusSearch,
    GoBack,
    GoForward,
    Reload,
    ReloadBypassCache,
    StopLoading,
    Print,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    PreviousTab,
    NextTab,
    /// 1-based tab position.
    SelectTab(u8),
    ToggleJavascript,
    ToggleImages,
    FindNext,
    FindPrevious,
}

impl Action {
    /// Actions still dispatched while a text entry holds focus.
    pub fn intercepts_text_entry(&self) -> bool {
        matches!(self, Action::NewTab | Action::CloseTab)
    }

    /// Stable name used in settings files.
    pub fn name(&self) -> String {
        match self {
            Action::NewTab => "new_tab".into(),
            Action::CloseTab => "close_tab".into(),
            Action::FocusLocation => "focus_location".into(),
            Action::FocusSearch => "focus_search".into(),
            Action::GoBack => "back".into(),
            Action::GoForward => "forward".into(),
            Action::Reload => "reload".into(),
            Action::ReloadBypassCache => "reload_bypass_cache".into(),
            Action::StopLoading => "stop_loading".into(),
            Action::Print => "print".into(),
            Action::ZoomIn => "zoom_in".into(),
            Action::ZoomOut => "zoom_out".into(),
            Action::ZoomReset => "zoom_reset".into(),
            Action::PreviousTab => "prev_tab".into(),
            Action::NextTab => "next_tab".into(),
            Action::SelectTab(n) => format!("select_tab_{}", n),
            Action::ToggleJavascript => "toggle_javascript".into(),
            Action::ToggleImages => "toggle_images".into(),
            Action::FindNext => "find_next".into(),
            Action::FindPrevious => "find_previous".into(),
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        let action = match name {
            "new_tab" => Action::NewTab,
            "close_tab" => Action::CloseTab,
            "focus_location" => Action::FocusLocation,
            "focus_search" => Action::FocusSearch,
            "back" => Action::GoBack,
            "forward" => Action::GoForward,
            "reload" => Action::Reload,
            "reload_bypass_cache" => Action::ReloadBypassCache,
            "stop_loading" => Action::StopLoading,
            "print" => Action::Print,
            "zoom_in" => Action::ZoomIn,
            "zoom_out" => Action::ZoomOut,
            "zoom_reset" => Action::ZoomReset,
            "prev_tab" => Action::PreviousTab,
            "next_tab" => Action::NextTab,
            "toggle_javascript" => Action::ToggleJavascript,
            "toggle_images" => Action::ToggleImages,
            "find_next" => Action::FindNext,
            "find_previous" => Action::FindPrevious,
            other => {
                let n = other.strip_prefix("select_tab_")?.parse::<u8>().ok()?;
                return (1..=9).contains(&n).then_some(Action::SelectTab(n));
            }
        };
        Some(action)
    }
}
