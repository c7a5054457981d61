use std::fs;

use serde_json::json;
use tempfile::TempDir;

use lupine::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use lupine::types::errors::SettingsError;
use lupine::types::settings::BrowserSettings;

fn engine_in(dir: &TempDir) -> SettingsEngine {
    SettingsEngine::new(Some(dir.path().join("settings.json")))
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings, BrowserSettings::default());
    assert!(!engine.get_config_path().exists());
}

#[test]
fn test_defaults() {
    let settings = BrowserSettings::default();
    assert_eq!(settings.general.homepage, "about:blank");
    assert!(settings.web.enable_javascript);
    assert!(settings.web.auto_load_images);
    assert_eq!(settings.window.default_width, 800);
    assert_eq!(settings.window.default_height, 600);
    assert_eq!(settings.keybindings.get("new_tab").map(String::as_str), Some("Ctrl+T"));
    assert_eq!(settings.keybindings.get("select_tab_9").map(String::as_str), Some("Alt+9"));
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value("general.homepage", json!("https://start.example")).unwrap();

    let mut reloaded = engine_in(&dir);
    let settings = reloaded.load().unwrap();
    assert_eq!(settings.general.homepage, "https://start.example");
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("settings.json");
    let engine = SettingsEngine::new(Some(path.clone()));
    engine.save().unwrap();
    assert!(path.exists());
}

#[test]
fn test_set_nested_value() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value("web.enable_javascript", json!(false)).unwrap();
    engine.set_value("window.tab_label_charwidth", json!(40)).unwrap();
    assert!(!engine.get_settings().web.enable_javascript);
    assert_eq!(engine.get_settings().window.tab_label_charwidth, 40);
}

#[test]
fn test_set_keybinding_adds_new_entry() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value("keybindings.find_next", json!("Ctrl+G")).unwrap();
    assert_eq!(
        engine.get_settings().keybindings.get("find_next").map(String::as_str),
        Some("Ctrl+G")
    );
}

#[test]
fn test_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    let result = engine.set_value("web.warp_drive", json!(true));
    assert!(matches!(result, Err(SettingsError::InvalidKey(_))));
    let result = engine.set_value("nowhere.at_all", json!(true));
    assert!(matches!(result, Err(SettingsError::InvalidKey(_))));
    assert!(!engine.get_config_path().exists());
}

#[test]
fn test_set_malformed_key_fails() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    for key in ["", ".", "web.", ".web", "web..zoom_step"] {
        assert!(
            matches!(engine.set_value(key, json!(1)), Err(SettingsError::InvalidKey(_))),
            "key {:?}",
            key
        );
    }
}

#[test]
fn test_set_wrong_type_fails_and_keeps_old_value() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    let result = engine.set_value("web.zoom_step", json!("big"));
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert_eq!(engine.get_settings().web.zoom_step, 0.1);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();
    let mut engine = SettingsEngine::new(Some(path));
    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_load_or_default_recovers_from_bad_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "[]").unwrap();
    let mut engine = SettingsEngine::new(Some(path));
    assert_eq!(engine.load_or_default(), BrowserSettings::default());
}

#[test]
fn test_reset() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value("content.load_userscripts", json!(false)).unwrap();
    engine.reset().unwrap();
    assert!(engine.get_settings().content.load_userscripts);

    let mut reloaded = engine_in(&dir);
    assert_eq!(reloaded.load().unwrap(), BrowserSettings::default());
}
