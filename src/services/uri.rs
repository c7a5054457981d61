//! Turns location-bar and command-line input into something the engine can load.

use std::fs;

/// Loaded when there is nothing to load.
pub const BLANK_URI: &str = "about:blank";

/// Returns the scheme of `text` when it starts with `scheme ":"` as defined by
/// RFC 3986: a letter followed by letters, digits, `+`, `-` or `.`.
pub fn parse_scheme(text: &str) -> Option<&str> {
    let colon = text.find(':')?;
    let scheme = &text[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return None,
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

/// Normalizes user input into a URI.
///
/// 1. empty or absent input gives [`BLANK_URI`];
/// 2. input with a scheme is returned unchanged;
/// 3. with `allow_file_fallback`, an existing path becomes a `file://` URI of its
///    canonical absolute form;
/// 4. anything else is guessed to be an `http://` address, without validation.
///
/// Tabs opened from another tab must pass `allow_file_fallback = false`.
pub fn normalize(input: Option<&str>, allow_file_fallback: bool) -> String {
    let text = match input {
        Some(t) if !t.is_empty() => t,
        _ => return BLANK_URI.to_string(),
    };

    if parse_scheme(text).is_some() {
        return text.to_string();
    }

    if allow_file_fallback {
        if let Ok(path) = fs::canonicalize(text) {
            return format!("file://{}", path.display());
        }
    }

    format!("http://{}", text)
}

/// Host part of a URI, if it parses as an absolute URL with a host.
pub fn host_of(uri: &str) -> Option<String> {
    url::Url::parse(uri)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

/// Last path segment of a URI, used as a fallback download filename.
pub fn filename_of(uri: &str) -> Option<String> {
    let parsed = url::Url::parse(uri).ok()?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back().map(|s| s.to_string()))
        .filter(|s| !s.is_empty())
}
