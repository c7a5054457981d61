// Lupine Settings Engine
// Loads, updates and resets the user's settings.json in the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::BrowserSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<BrowserSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &BrowserSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings persisted as pretty-printed JSON.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: BrowserSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, `<config>/settings.json` otherwise.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path = path_override.unwrap_or_else(platform::get_settings_path);
        Self {
            config_path,
            settings: BrowserSettings::default(),
        }
    }

    /// Like [`SettingsEngineTrait::load`], but a broken file falls back to
    /// defaults with a warning instead of failing startup.
    pub fn load_or_default(&mut self) -> BrowserSettings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, self.config_path.display());
                self.settings = BrowserSettings::default();
                self.settings.clone()
            }
        }
    }

    /// Walks a dot-separated path through a JSON object tree and replaces the leaf.
    fn replace_at_path(
        root: &mut serde_json::Value,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), SettingsError> {
        let not_found = || SettingsError::InvalidKey(format!("Key '{}' not found in settings", key));
        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };

        let mut current = root;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(not_found)?;
        }

        match current {
            // keybindings is an open map; new action names are checked later.
            serde_json::Value::Object(map) if map.contains_key(leaf) || parents == Some("keybindings") => {
                map.insert(leaf.to_string(), value);
                Ok(())
            }
            serde_json::Value::Object(_) => Err(not_found()),
            _ => Err(SettingsError::InvalidKey(format!(
                "Cannot navigate to key '{}': intermediate value is not an object",
                key
            ))),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Missing file gives defaults; a malformed one is an error.
    fn load(&mut self) -> Result<BrowserSettings, SettingsError> {
        if !self.config_path.exists() {
            self.settings = BrowserSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: BrowserSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        log::debug!("loaded settings from {}", self.config_path.display());
        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Updates one setting by dot path (`"web.enable_javascript"`,
    /// `"keybindings.new_tab"`) and saves. The whole tree is re-validated
    /// through serde before anything changes.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() || key.split('.').any(|p| p.is_empty()) {
            return Err(SettingsError::InvalidKey(format!("Malformed key '{}'", key)));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        Self::replace_at_path(&mut json_value, key, value)?;

        let new_settings: BrowserSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = BrowserSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
