//! Keybinding Manager for Lupine.
//!
//! Maps key chords to actions, scoped by which widget has focus.
//! Window-scope bindings are configurable; a few scoped bindings are fixed.

use std::collections::HashMap;

use crate::types::errors::KeybindingError;
use crate::types::keys::{Action, FocusScope, Key, KeyChord, Modifiers, PointerButton};
use crate::types::settings::BrowserSettings;

/// Trait defining keybinding operations.
pub trait KeybindingManagerTrait {
    fn register_binding(&mut self, action: &str, chord: &str) -> Result<(), KeybindingError>;
    fn unregister_binding(&mut self, action: &str) -> Result<(), KeybindingError>;
    fn get_binding(&self, action: &str) -> Option<KeyChord>;
    fn list_bindings(&self) -> Vec<(Action, KeyChord)>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, chord: &KeyChord, exclude_action: Option<Action>) -> Option<Action>;
    fn dispatch(&self, chord: &KeyChord, scope: FocusScope, text_entry_focused: bool)
        -> Option<Action>;
    fn dispatch_pointer(&self, scope: FocusScope, button: PointerButton) -> Option<Action>;
}

/// Bindings that only apply in one focus scope and are not configurable.
const SCOPED_BINDINGS: &[(FocusScope, KeyChord, Action)] = &[
    (
        FocusScope::Window,
        KeyChord { key: Key::F(5), modifiers: Modifiers::NONE },
        Action::Reload,
    ),
    (
        FocusScope::WebView,
        KeyChord { key: Key::Escape, modifiers: Modifiers::NONE },
        Action::StopLoading,
    ),
];

/// Keybinding table with one chord per action.
pub struct KeybindingManager {
    bindings: HashMap<Action, KeyChord>,
}

impl KeybindingManager {
    pub fn new() -> Self {
        Self { bindings: Self::default_bindings() }
    }

    /// Defaults overridden by the user's `keybindings` table. Overridden actions
    /// drop their default chord first, so overrides may trade chords among
    /// themselves. Bad or conflicting entries are logged and skipped, leaving
    /// the default in place when its chord is still free.
    pub fn from_settings(overrides: &HashMap<String, String>) -> Self {
        let mut names: Vec<&String> = overrides.keys().collect();
        names.sort();

        let mut parsed = Vec::new();
        for name in names {
            let chord = &overrides[name];
            match (Self::parse_action(name), KeyChord::parse(chord)) {
                (Ok(action), Some(c)) => parsed.push((action, c)),
                (Err(e), _) => log::warn!("ignoring keybinding {} = {}: {}", name, chord, e),
                (_, None) => log::warn!(
                    "ignoring keybinding {} = {}: {}",
                    name,
                    chord,
                    KeybindingError::InvalidChord(chord.clone())
                ),
            }
        }

        let defaults = Self::default_bindings();
        let mut mgr = Self { bindings: defaults.clone() };
        for (action, _) in &parsed {
            mgr.bindings.remove(action);
        }
        let mut rejected = Vec::new();
        for (action, chord) in parsed {
            if let Err(e) = mgr.bind(action, chord) {
                log::warn!("ignoring keybinding {} = {}: {}", action.name(), chord, e);
                rejected.push(action);
            }
        }
        for action in rejected {
            if let Some(default) = defaults.get(&action) {
                if let Err(e) = mgr.bind(action, *default) {
                    log::warn!("{} left unbound: {}", action.name(), e);
                }
            }
        }
        mgr
    }

    fn bind(&mut self, action: Action, chord: KeyChord) -> Result<(), KeybindingError> {
        if let Some(other) = self.has_conflict(&chord, Some(action)) {
            return Err(KeybindingError::Conflict(format!(
                "'{}' is already bound to '{}'",
                chord,
                other.name()
            )));
        }
        self.bindings.insert(action, chord);
        Ok(())
    }

    fn default_bindings() -> HashMap<Action, KeyChord> {
        BrowserSettings::default_keybindings()
            .iter()
            .filter_map(|(name, chord)| Some((Action::from_name(name)?, KeyChord::parse(chord)?)))
            .collect()
    }

    fn parse_action(action: &str) -> Result<Action, KeybindingError> {
        Action::from_name(action).ok_or_else(|| KeybindingError::UnknownAction(action.to_string()))
    }
}

impl Default for KeybindingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingManagerTrait for KeybindingManager {
    fn register_binding(&mut self, action: &str, chord: &str) -> Result<(), KeybindingError> {
        let action = Self::parse_action(action)?;
        let parsed =
            KeyChord::parse(chord).ok_or_else(|| KeybindingError::InvalidChord(chord.to_string()))?;
        self.bind(action, parsed)
    }

    fn unregister_binding(&mut self, action: &str) -> Result<(), KeybindingError> {
        let parsed = Self::parse_action(action)?;
        self.bindings
            .remove(&parsed)
            .map(|_| ())
            .ok_or_else(|| KeybindingError::NotFound(action.to_string()))
    }

    fn get_binding(&self, action: &str) -> Option<KeyChord> {
        let action = Action::from_name(action)?;
        self.bindings.get(&action).copied()
    }

    /// Sorted by action name.
    fn list_bindings(&self) -> Vec<(Action, KeyChord)> {
        let mut list: Vec<(Action, KeyChord)> =
            self.bindings.iter().map(|(a, c)| (*a, *c)).collect();
        list.sort_by_key(|(a, _)| a.name());
        list
    }

    fn reset_to_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Fixed scoped bindings are checked too.
    fn has_conflict(&self, chord: &KeyChord, exclude_action: Option<Action>) -> Option<Action> {
        SCOPED_BINDINGS
            .iter()
            .map(|(_, bound, action)| (action, bound))
            .chain(self.bindings.iter())
            .find(|(action, bound)| *bound == chord && Some(**action) != exclude_action)
            .map(|(action, _)| *action)
    }

    /// Scoped bindings win over window bindings. With a text entry focused only
    /// actions that always intercept are returned.
    fn dispatch(
        &self,
        chord: &KeyChord,
        scope: FocusScope,
        text_entry_focused: bool,
    ) -> Option<Action> {
        let scoped = SCOPED_BINDINGS
            .iter()
            .find(|(s, c, _)| *c == *chord && (*s == scope || *s == FocusScope::Window))
            .map(|(_, _, action)| *action);

        let action = scoped.or_else(|| {
            self.bindings
                .iter()
                .find(|(_, bound)| *bound == chord)
                .map(|(action, _)| *action)
        })?;

        if text_entry_focused && !action.intercepts_text_entry() {
            return None;
        }
        Some(action)
    }

    fn dispatch_pointer(&self, scope: FocusScope, button: PointerButton) -> Option<Action> {
        match (scope, button) {
            (FocusScope::TabBox, PointerButton::Middle) => Some(Action::CloseTab),
            _ => None,
        }
    }
}
