// Lupine platform paths for Windows
// Config:    %APPDATA%\Lupine
// Data:      %APPDATA%\Lupine
// Cache:     %LOCALAPPDATA%\Lupine\cache
// Downloads: %USERPROFILE%\Downloads

use std::env;
use std::path::PathBuf;

fn env_dir(var: &str, fallback: &str) -> PathBuf {
    PathBuf::from(env::var(var).unwrap_or_else(|_| String::from(fallback)))
}

pub fn get_config_dir() -> PathBuf {
    env_dir("APPDATA", "C:\\Users\\Default\\AppData\\Roaming").join("Lupine")
}

pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}

pub fn get_cache_dir() -> PathBuf {
    env_dir("LOCALAPPDATA", "C:\\Users\\Default\\AppData\\Local")
        .join("Lupine")
        .join("cache")
}

pub fn get_downloads_dir() -> PathBuf {
    env_dir("USERPROFILE", "C:\\Users\\Default").join("Downloads")
}
