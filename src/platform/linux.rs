// Lupine platform paths for Linux
// Config:    $XDG_CONFIG_HOME/lupine   (~/.config/lupine)
// Data:      $XDG_DATA_HOME/lupine     (~/.local/share/lupine)
// Cache:     $XDG_CACHE_HOME/lupine    (~/.cache/lupine)
// Downloads: $XDG_DOWNLOAD_DIR         (~/Downloads)

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "lupine";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$<xdg_var>/lupine` when set and non-empty, `~/<fallback>/lupine` otherwise.
fn xdg_dir(xdg: Option<String>, home: PathBuf, fallback: &[&str]) -> PathBuf {
    match xdg.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir).join(APP_DIR),
        None => fallback.iter().fold(home, |p, part| p.join(part)).join(APP_DIR),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_dir(env::var("XDG_CONFIG_HOME").ok(), home_dir(), &[".config"])
}

pub fn get_data_dir() -> PathBuf {
    xdg_dir(env::var("XDG_DATA_HOME").ok(), home_dir(), &[".local", "share"])
}

pub fn get_cache_dir() -> PathBuf {
    xdg_dir(env::var("XDG_CACHE_HOME").ok(), home_dir(), &[".cache"])
}

pub fn get_downloads_dir() -> PathBuf {
    match env::var("XDG_DOWNLOAD_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join("Downloads"),
    }
}
