use std::fs;

use tempfile::TempDir;

use lupine::app::{parse_language_list, App, AppPaths};
use lupine::managers::download_manager::DownloadManagerTrait;
use lupine::managers::tab_manager::TabManagerTrait;
use lupine::types::context::ContextId;
use lupine::types::download::DownloadState;
use lupine::types::event::{Effect, EngineEvent, NavigationRequest, PolicyDecision};
use lupine::types::keys::{Action, FocusScope, KeyChord, PointerButton};
use lupine::types::settings::BrowserSettings;

fn paths_in(dir: &TempDir) -> AppPaths {
    AppPaths {
        settings: dir.path().join("config").join("settings.json"),
        filter_source: dir.path().join("config").join("content-filters.json"),
        filter_store: dir.path().join("cache").join("filters"),
        scripts_dir: dir.path().join("data").join("scripts"),
        downloads_dir: dir.path().join("Downloads"),
    }
}

fn key(s: &str) -> KeyChord {
    KeyChord::parse(s).unwrap()
}

#[test]
fn test_startup_without_args_opens_homepage() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    let effects = app.startup(&[]);

    assert_eq!(app.tab_manager.tab_count(), 1);
    let tab = app.tab_manager.get_current_tab().unwrap();
    assert_eq!(tab.location, "about:blank");
    assert!(effects.contains(&Effect::LoadUri {
        tab_id: tab.id.clone(),
        uri: "about:blank".to_string(),
    }));
    assert!(app.content_filter.is_none());
    assert!(app.userscripts.is_empty());
}

#[test]
fn test_startup_opens_one_root_tab_per_argument() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&["a.example".to_string(), "https://b.example".to_string()]);

    let tabs = app.tab_manager.get_all_tabs();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0].location, "http://a.example");
    assert_eq!(tabs[1].location, "https://b.example");
    assert_ne!(tabs[0].context_id, tabs[1].context_id);
}

#[test]
fn test_startup_loads_filter_and_userscripts() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    fs::create_dir_all(paths.filter_source.parent().unwrap()).unwrap();
    fs::write(
        &paths.filter_source,
        r#"[{ "trigger": { "url-filter": "ads\\.example" }, "action": { "type": "block" } }]"#,
    )
    .unwrap();
    fs::create_dir_all(&paths.scripts_dir).unwrap();
    fs::write(paths.scripts_dir.join("dark.js"), "document.body.style.background='#000';")
        .unwrap();

    let mut app = App::new(paths);
    app.startup(&[]);
    assert_eq!(app.content_filter.as_ref().unwrap().rule_count(), 1);
    assert_eq!(app.userscripts.len(), 1);

    let tab_id = app.tab_manager.get_current_tab().unwrap().id.clone();
    let blocked = app.handle_engine_event(
        &tab_id,
        EngineEvent::NavigationDecision(NavigationRequest::plain("https://ads.example/x.js")),
    );
    assert_eq!(blocked, vec![Effect::Decide(PolicyDecision::Ignore)]);

    let allowed = app.handle_engine_event(
        &tab_id,
        EngineEvent::NavigationDecision(NavigationRequest::plain("https://news.example/")),
    );
    assert_eq!(allowed, vec![Effect::Decide(PolicyDecision::Default)]);
}

#[test]
fn test_disabled_features_are_skipped() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    fs::create_dir_all(&paths.scripts_dir).unwrap();
    fs::write(paths.scripts_dir.join("x.js"), "1;").unwrap();
    fs::create_dir_all(paths.settings.parent().unwrap()).unwrap();
    fs::write(&paths.filter_source, "[]").unwrap();

    let mut settings = serde_json::to_value(BrowserSettings::default()).unwrap();
    settings["content"]["load_userscripts"] = serde_json::json!(false);
    settings["content"]["content_filtering"] = serde_json::json!(false);
    fs::write(&paths.settings, settings.to_string()).unwrap();

    let mut app = App::new(paths);
    app.startup(&[]);
    assert!(app.userscripts.is_empty());
    assert!(app.content_filter.is_none());
}

#[test]
fn test_keybinding_overrides_from_settings() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let mut settings = BrowserSettings::default();
    settings.keybindings.insert("new_tab".to_string(), "Ctrl+N".to_string());
    fs::create_dir_all(paths.settings.parent().unwrap()).unwrap();
    fs::write(&paths.settings, serde_json::to_string(&settings).unwrap()).unwrap();

    let mut app = App::new(paths);
    app.startup(&[]);
    assert!(app.handle_key(&key("Ctrl+T"), FocusScope::Window, false).is_none());
    assert!(app.handle_key(&key("Ctrl+N"), FocusScope::Window, false).is_some());
    assert_eq!(app.tab_manager.tab_count(), 2);
}

#[test]
fn test_new_tab_key_opens_fresh_context_and_focuses_location() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&[]);

    let effects = app.handle_key(&key("Ctrl+T"), FocusScope::LocationBar, true).unwrap();
    let current = app.tab_manager.get_current_tab().unwrap();
    assert_eq!(current.context_id, ContextId(1));
    assert_eq!(effects.last(), Some(&Effect::FocusLocation { tab_id: current.id.clone() }));
}

#[test]
fn test_text_entry_keeps_editing_keys() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&[]);
    assert!(app.handle_key(&key("Ctrl+R"), FocusScope::LocationBar, true).is_none());
    assert!(app.handle_key(&key("Ctrl+Q"), FocusScope::Window, false).is_none());
}

#[test]
fn test_closing_last_tab_quits() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&["one.example".to_string(), "two.example".to_string()]);

    let effects = app.handle_key(&key("Ctrl+W"), FocusScope::Window, false).unwrap();
    assert!(!effects.contains(&Effect::Quit));
    let effects = app.handle_key(&key("Ctrl+W"), FocusScope::Window, false).unwrap();
    assert!(effects.contains(&Effect::Quit));
    assert_eq!(app.tab_manager.tab_count(), 0);

    // Nothing left to act on.
    assert_eq!(app.handle_action(Action::Reload), Vec::new());
}

#[test]
fn test_page_close_request_of_last_tab_quits() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&[]);
    let tab_id = app.tab_manager.get_current_tab().unwrap().id.clone();
    let effects = app.handle_engine_event(&tab_id, EngineEvent::CloseRequested);
    assert_eq!(effects.last(), Some(&Effect::Quit));
}

#[test]
fn test_middle_click_on_tab_label_closes_that_tab() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&["one.example".to_string(), "two.example".to_string()]);
    let second = app.tab_manager.get_tab_order()[1].clone();

    let effects = app.handle_pointer(&second, FocusScope::TabBox, PointerButton::Middle);
    assert_eq!(effects, vec![Effect::DestroyTab { tab_id: second.clone() }]);
    assert!(app.tab_manager.get_tab(&second).is_none());

    let first = app.tab_manager.get_tab_order()[0].clone();
    assert!(app.handle_pointer(&first, FocusScope::TabBox, PointerButton::Primary).is_empty());
}

#[test]
fn test_select_tab_action() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&["one.example".to_string(), "two.example".to_string()]);
    let second = app.tab_manager.get_tab_order()[1].clone();

    app.handle_key(&key("Alt+2"), FocusScope::Window, false).unwrap();
    assert_eq!(app.tab_manager.get_current_tab().unwrap().id, second);
    assert!(app.handle_action(Action::SelectTab(5)).is_empty());
}

#[test]
fn test_download_from_engine_gets_destination() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let downloads_dir = paths.downloads_dir.clone();
    let mut app = App::new(paths);
    app.startup(&[]);
    let tab_id = app.tab_manager.get_current_tab().unwrap().id.clone();

    let effects = app.handle_engine_event(
        &tab_id,
        EngineEvent::DownloadStarted {
            uri: "https://files.example/pub/report.pdf".to_string(),
            suggested_filename: None,
        },
    );
    let download_id = match &effects[..] {
        [Effect::UpdateDownloadRow { download_id }] => download_id.clone(),
        other => panic!("unexpected effects {:?}", other),
    };

    let download = app.download_manager.get(&download_id).unwrap();
    assert_eq!(download.context_id, Some(ContextId(0)));
    assert_eq!(download.destination, Some(downloads_dir.join("report.pdf")));
    assert_eq!(download.state, DownloadState::DestinationChosen);
}

#[test]
fn test_download_without_tab_or_name() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let downloads_dir = paths.downloads_dir.clone();
    let mut app = App::new(paths);

    let (id, destination) = app.begin_download(None, "https://files.example/", None);
    assert_eq!(destination, downloads_dir.join("download"));
    assert_eq!(app.download_manager.get(&id).unwrap().context_id, None);
}

#[test]
fn test_dismiss_download() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    let (id, _) = app.begin_download(None, "https://files.example/a.zip", Some("a.zip"));

    assert_eq!(
        app.dismiss_download(&id),
        vec![Effect::RemoveDownloadRow { download_id: id.clone() }]
    );
    assert!(app.dismiss_download(&id).is_empty());
}

#[test]
fn test_submit_location_and_search() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&[]);
    let tab_id = app.tab_manager.get_current_tab().unwrap().id.clone();

    let effects = app.submit_location(&tab_id, "https://typed.example");
    assert!(effects.contains(&Effect::LoadUri {
        tab_id: tab_id.clone(),
        uri: "https://typed.example".to_string(),
    }));
    assert_eq!(
        app.search(&tab_id, "needle"),
        vec![Effect::Find { tab_id: tab_id.clone(), text: "needle".to_string() }]
    );
    assert!(app.submit_location("gone", "x").is_empty());
}

#[test]
fn test_ctrl_wheel_zooms_current_tab() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(paths_in(&dir));
    app.startup(&[]);
    let tab_id = app.tab_manager.get_current_tab().unwrap().id.clone();

    let effects = app.scroll_zoom(&tab_id, -1.0);
    assert_eq!(effects.len(), 1);
    assert!(matches!(
        &effects[0],
        Effect::SetZoom { tab_id: id, level } if *id == tab_id && (*level - 1.1).abs() < 1e-9
    ));
    app.scroll_zoom(&tab_id, 1.0);
    app.scroll_zoom(&tab_id, 1.0);
    assert!((app.tab_manager.get_tab(&tab_id).unwrap().zoom_level - 0.9).abs() < 1e-9);
    assert!(app.scroll_zoom("gone", 1.0).is_empty());
}

#[test]
fn test_parse_language_list() {
    assert_eq!(parse_language_list("en_US:de_DE"), vec!["en_US", "de_DE"]);
    assert_eq!(parse_language_list(" fr :: "), vec!["fr"]);
    assert!(parse_language_list("").is_empty());
}
