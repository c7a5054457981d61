// Lupine platform abstraction
// Directory layout for Windows, macOS and Linux, and the files Lupine keeps in it.
//
// Uses `cfg(target_os)` to select the platform implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as imp;
#[cfg(target_os = "macos")]
use macos as imp;
#[cfg(target_os = "windows")]
use windows as imp;

/// Configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/lupine` or `~/.config/lupine`
/// - **macOS**: `~/Library/Application Support/Lupine`
/// - **Windows**: `%APPDATA%/Lupine`
pub fn get_config_dir() -> PathBuf {
    imp::get_config_dir()
}

/// Data directory (userscripts, interface stylesheet).
///
/// - **Linux**: `$XDG_DATA_HOME/lupine` or `~/.local/share/lupine`
/// - **macOS**: `~/Library/Application Support/Lupine`
/// - **Windows**: `%APPDATA%/Lupine`
pub fn get_data_dir() -> PathBuf {
    imp::get_data_dir()
}

/// Cache directory (compiled content filters).
pub fn get_cache_dir() -> PathBuf {
    imp::get_cache_dir()
}

/// Where downloads land unless the user picks another place.
pub fn get_downloads_dir() -> PathBuf {
    imp::get_downloads_dir()
}

pub fn get_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}

/// Content-blocker rule list written by the user.
pub fn get_filter_source_path() -> PathBuf {
    get_config_dir().join("content-filters.json")
}

/// Store holding compiled filters, one file per identifier.
pub fn get_filter_store_dir() -> PathBuf {
    get_cache_dir().join("filters")
}

pub fn get_scripts_dir() -> PathBuf {
    get_data_dir().join("scripts")
}

/// Optional user stylesheet applied to the chrome.
pub fn get_interface_css_path() -> PathBuf {
    get_data_dir().join("interface.css")
}
