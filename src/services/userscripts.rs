// Lupine Userscripts
// Finds `*.js` files in the scripts directory. Each one is injected at document
// start in every frame by the UI shell.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::errors::UserscriptError;

/// A script read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct UserScript {
    pub path: PathBuf,
    pub source: String,
}

/// Outcome of a scan: what loaded and what did not.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub scripts: Vec<UserScript>,
    pub failures: Vec<UserscriptError>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.scripts.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Reads every `*.js` in `dir`, in path order. A file that cannot be read is
/// logged and counted, and the others still load. A missing directory is not an error.
pub fn load_userscripts(dir: &Path) -> Result<LoadReport, UserscriptError> {
    let pattern = dir.join("*.js");
    let pattern = pattern.to_string_lossy();
    log::info!("checking for userscripts matching {}", pattern);

    let entries = glob::glob(&pattern)
        .map_err(|e| UserscriptError::InvalidPattern(format!("{}: {}", pattern, e)))?;

    let mut paths = Vec::new();
    let mut report = LoadReport::default();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => {
                let err = UserscriptError::Read {
                    path: e.path().display().to_string(),
                    message: e.error().to_string(),
                };
                log::warn!("{}", err);
                report.failures.push(err);
            }
        }
    }
    paths.sort();

    if paths.is_empty() && report.failures.is_empty() {
        log::info!("no userscripts found");
        return Ok(report);
    }

    for path in paths {
        match fs::read_to_string(&path) {
            Ok(source) => report.scripts.push(UserScript { path, source }),
            Err(e) => {
                let err = UserscriptError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                };
                log::warn!("{}", err);
                report.failures.push(err);
            }
        }
    }

    log::info!(
        "userscript loading: {} loaded, {} failed to load",
        report.loaded(),
        report.failed()
    );
    Ok(report)
}
