use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use lupine::services::uri::{filename_of, host_of, normalize, BLANK_URI};

#[rstest]
#[case(None, true, "about:blank")]
#[case(Some(""), true, "about:blank")]
#[case(Some(""), false, "about:blank")]
#[case(Some("example.com"), false, "http://example.com")]
#[case(Some("https://example.com"), true, "https://example.com")]
#[case(Some("about:config"), false, "about:config")]
#[case(Some("mailto:someone@example.org"), false, "mailto:someone@example.org")]
fn test_normalize_cases(
    #[case] input: Option<&str>,
    #[case] allow_file_fallback: bool,
    #[case] expected: &str,
) {
    assert_eq!(normalize(input, allow_file_fallback), expected);
}

#[test]
fn test_blank_sentinel() {
    assert_eq!(BLANK_URI, "about:blank");
}

#[test]
fn test_existing_path_becomes_file_uri() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<p>hi</p>").unwrap();

    let uri = normalize(Some(page.to_str().unwrap()), true);
    let canonical = fs::canonicalize(&page).unwrap();
    assert_eq!(uri, format!("file://{}", canonical.display()));
}

#[test]
fn test_relative_path_is_canonicalized() {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("a");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("b.html"), "").unwrap();

    let dotted = sub.join("..").join("b.html");
    let uri = normalize(Some(dotted.to_str().unwrap()), true);
    assert!(uri.starts_with("file://"));
    assert!(!uri.contains(".."));
}

#[test]
fn test_existing_path_without_fallback_is_http_guess() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_str().unwrap().to_string();
    assert_eq!(normalize(Some(&path), false), format!("http://{}", path));
}

#[test]
fn test_missing_path_falls_back_to_http() {
    let missing = "/definitely/not/here/lupine-test";
    assert_eq!(normalize(Some(missing), true), format!("http://{}", missing));
}

#[test]
fn test_etc_hosts() {
    let uri = normalize(Some("/etc/hosts"), true);
    if std::path::Path::new("/etc/hosts").exists() {
        assert!(uri.starts_with("file://"));
    } else {
        assert_eq!(uri, "http:///etc/hosts");
    }
}

#[test]
fn test_host_and_filename_helpers() {
    assert_eq!(host_of("https://sub.example.org:8443/x"), Some("sub.example.org".to_string()));
    assert_eq!(host_of("about:blank"), None);
    assert_eq!(filename_of("https://example.org/dl/file.zip?x=1"), Some("file.zip".to_string()));
}
