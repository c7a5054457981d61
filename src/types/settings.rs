use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level browser settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserSettings {
    pub general: GeneralSettings,
    pub web: WebSettings,
    pub window: WindowSettings,
    pub content: ContentSettings,
    /// Action name -> chord string, e.g. `"new_tab" -> "Ctrl+T"`.
    pub keybindings: HashMap<String, String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            web: WebSettings::default(),
            window: WindowSettings::default(),
            content: ContentSettings::default(),
            keybindings: Self::default_keybindings(),
        }
    }
}

impl BrowserSettings {
    /// Returns the default window-scope keybindings.
    pub fn default_keybindings() -> HashMap<String, String> {
        let defaults = [
            ("new_tab", "Ctrl+T"),
            ("close_tab", "Ctrl+W"),
            ("focus_location", "Ctrl+L"),
            ("focus_search", "Ctrl+F"),
            ("back", "Alt+Left"),
            ("forward", "Alt+Right"),
            ("reload", "Ctrl+R"),
            ("reload_bypass_cache", "Ctrl+Shift+R"),
            ("print", "Ctrl+P"),
            ("zoom_in", "Ctrl+Plus"),
            ("zoom_out", "Ctrl+Minus"),
            ("zoom_reset", "Ctrl+0"),
            ("prev_tab", "Ctrl+PageUp"),
            ("next_tab", "Ctrl+PageDown"),
            ("toggle_javascript", "Ctrl+Shift+J"),
            ("toggle_images", "Ctrl+Shift+I"),
        ];
        let mut bindings: HashMap<String, String> = defaults
            .iter()
            .map(|(a, k)| (a.to_string(), k.to_string()))
            .collect();
        for n in 1..=9 {
            bindings.insert(format!("select_tab_{}", n), format!("Alt+{}", n));
        }
        bindings
    }
}

/// General browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub homepage: String,
    /// Colon-separated spellcheck languages; overridden by `LUPINE_L10N`.
    #[serde(default)]
    pub spellcheck_languages: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            homepage: "about:blank".to_string(),
            spellcheck_languages: None,
        }
    }
}

/// Engine settings applied to every new view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSettings {
    pub enable_javascript: bool,
    pub auto_load_images: bool,
    pub javascript_can_open_windows_automatically: bool,
    pub media_playback_requires_user_gesture: bool,
    pub enable_developer_extras: bool,
    pub minimum_font_size: u32,
    pub default_zoom: f64,
    pub zoom_step: f64,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            enable_javascript: true,
            auto_load_images: true,
            javascript_can_open_windows_automatically: false,
            media_playback_requires_user_gesture: true,
            enable_developer_extras: false,
            minimum_font_size: 8,
            default_zoom: 1.0,
            zoom_step: 0.1,
        }
    }
}

/// Main window layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowSettings {
    pub default_width: u32,
    pub default_height: u32,
    /// Characters the tab label text fits before ellipsizing.
    pub tab_label_charwidth: usize,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            tab_label_charwidth: 26,
        }
    }
}

/// Userscripts and content filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentSettings {
    pub load_userscripts: bool,
    pub content_filtering: bool,
    /// Identifier the compiled filter is stored under.
    pub filter_identifier: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            load_userscripts: true,
            content_filtering: true,
            filter_identifier: "a".to_string(),
        }
    }
}
