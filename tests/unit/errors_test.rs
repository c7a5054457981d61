use lupine::types::errors::*;

// === TabError Tests ===

#[test]
fn tab_error_not_found_display() {
    let err = TabError::NotFound("tab-123".to_string());
    assert_eq!(err.to_string(), "Tab not found: tab-123");
}

#[test]
fn tab_error_closing_display() {
    let err = TabError::Closing("tab-456".to_string());
    assert_eq!(err.to_string(), "Tab is closing: tab-456");
}

#[test]
fn tab_error_invalid_index_display() {
    let err = TabError::InvalidIndex(99);
    assert_eq!(err.to_string(), "Invalid tab index: 99");
}

#[test]
fn tab_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(TabError::NotFound("id".to_string()));
    assert!(err.source().is_none());
}

// === DownloadError Tests ===

#[test]
fn download_error_display_variants() {
    assert_eq!(
        DownloadError::NotFound("d1".to_string()).to_string(),
        "Download not found: d1"
    );
    assert_eq!(
        DownloadError::DestinationAlreadyChosen("d1".to_string()).to_string(),
        "Download destination already chosen: d1"
    );
    assert_eq!(
        DownloadError::DestinationNotChosen("d1".to_string()).to_string(),
        "Download destination not chosen yet: d1"
    );
    assert_eq!(
        DownloadError::ProgressRegressed { id: "d1".to_string(), current: 10, attempted: 5 }
            .to_string(),
        "Download progress regressed for d1: 10 -> 5"
    );
    assert_eq!(
        DownloadError::AlreadyTerminated("d1".to_string()).to_string(),
        "Download already terminated: d1"
    );
}

// === KeybindingError Tests ===

#[test]
fn keybinding_error_display_variants() {
    assert_eq!(
        KeybindingError::NotFound("print".to_string()).to_string(),
        "Keybinding not found for action: print"
    );
    assert_eq!(
        KeybindingError::InvalidChord("Ctrl+".to_string()).to_string(),
        "Invalid key chord: Ctrl+"
    );
    assert_eq!(
        KeybindingError::UnknownAction("fly".to_string()).to_string(),
        "Unknown action: fly"
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::IoError("disk full".to_string()).to_string(),
        "Settings I/O error: disk full"
    );
    assert_eq!(
        SettingsError::InvalidKey("a.b".to_string()).to_string(),
        "Invalid settings key: a.b"
    );
}

// === FilterError Tests ===

#[test]
fn filter_error_codes() {
    let io = FilterError::Io { code: 2, message: "missing".to_string() };
    assert_eq!(io.code(), 2);
    assert_eq!(io.to_string(), "Content filter I/O error [2]: missing");
    assert_eq!(FilterError::NotFound("a".to_string()).code(), -1);
    assert_eq!(
        FilterError::Parse { code: 0, message: "bad".to_string() }.to_string(),
        "Content filter parse error [0]: bad"
    );
}

// === UserscriptError Tests ===

#[test]
fn userscript_error_display() {
    let err = UserscriptError::Read { path: "/x/a.js".to_string(), message: "denied".to_string() };
    assert_eq!(err.to_string(), "Error reading userscript /x/a.js: denied");
}
