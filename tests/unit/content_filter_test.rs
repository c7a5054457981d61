use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use lupine::services::content_filter::{ContentFilter, FilterStore, Rule};
use lupine::types::errors::FilterError;

const RULES: &str = r#"[
    { "trigger": { "url-filter": "doubleclick\\.net" }, "action": { "type": "block" } },
    { "trigger": { "url-filter": "/ads/" }, "action": { "type": "block" } },
    { "trigger": { "url-filter": "example\\.org/ads/" }, "action": { "type": "ignore-previous-rules" } },
    { "trigger": { "url-filter": ".*" }, "action": { "type": "css-display-none", "selector": ".banner" } },
    { "trigger": { "url-filter": "Tracker", "url-filter-is-case-sensitive": true }, "action": { "type": "block" } }
]"#;

fn write_source(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("content-filters.json");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_compile_then_load() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, RULES);
    let store = FilterStore::new(dir.path().join("store"));

    let compiled = store.compile_from_file("a", &source).unwrap();
    assert_eq!(compiled.rule_count(), 5);
    assert!(dir.path().join("store").join("a.json").exists());

    let filter = store.load("a").unwrap();
    assert_eq!(filter.identifier(), "a");
    assert_eq!(filter.rule_count(), 5);
}

#[test]
fn test_blocking_decisions() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, RULES);
    let store = FilterStore::new(dir.path().join("store"));
    let filter = store.refresh("a", &source).unwrap();

    assert!(filter.should_block("https://ad.doubleclick.net/pixel"));
    assert!(filter.should_block("https://news.example.com/ads/top.png"));
    assert!(!filter.should_block("https://example.org/ads/house.png"));
    assert!(!filter.should_block("https://example.com/article"));
    assert!(filter.should_block("https://cdn.example.com/Tracker.js"));
    assert!(!filter.should_block("https://cdn.example.com/tracker.js"));
}

#[test]
fn test_load_missing_identifier() {
    let dir = TempDir::new().unwrap();
    let store = FilterStore::new(dir.path());
    let err = store.load("missing").unwrap_err();
    assert_eq!(err, FilterError::NotFound("missing".to_string()));
    assert_eq!(err.code(), -1);
}

#[test]
fn test_missing_source_is_io_error() {
    let dir = TempDir::new().unwrap();
    let store = FilterStore::new(dir.path().join("store"));
    let err = store.compile_from_file("a", &dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, FilterError::Io { .. }));
    assert!(store.refresh("a", &dir.path().join("nope.json")).is_none());
}

#[test]
fn test_malformed_source_does_not_replace_store() {
    let dir = TempDir::new().unwrap();
    let store = FilterStore::new(dir.path().join("store"));
    let good = write_source(&dir, RULES);
    store.compile_from_file("a", &good).unwrap();

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"[{ "trigger": {} }]"#).unwrap();
    let err = store.compile_from_file("a", &bad).unwrap_err();
    assert!(matches!(err, FilterError::Parse { code: 0, .. }));

    assert_eq!(store.load("a").unwrap().rule_count(), 5);
}

#[test]
fn test_invalid_regex_in_source() {
    let dir = TempDir::new().unwrap();
    let store = FilterStore::new(dir.path().join("store"));
    let source = write_source(
        &dir,
        r#"[{ "trigger": { "url-filter": "([" }, "action": { "type": "block" } }]"#,
    );
    let err = store.compile_from_file("a", &source).unwrap_err();
    assert!(matches!(err, FilterError::InvalidPattern { .. }));
    assert!(matches!(store.load("a"), Err(FilterError::NotFound(_))));
}

#[test]
fn test_remove() {
    let dir = TempDir::new().unwrap();
    let store = FilterStore::new(dir.path().join("store"));
    let source = write_source(&dir, RULES);
    store.compile_from_file("a", &source).unwrap();

    store.remove("a").unwrap();
    assert!(matches!(store.load("a"), Err(FilterError::NotFound(_))));
    assert_eq!(store.remove("a"), Err(FilterError::NotFound("a".to_string())));
}

#[test]
fn test_empty_rule_list_blocks_nothing() {
    let filter = ContentFilter::from_rules("empty", Vec::<Rule>::new()).unwrap();
    assert_eq!(filter.rule_count(), 0);
    assert!(!filter.should_block("https://doubleclick.net/"));
}
