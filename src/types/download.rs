use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::context::ContextId;

/// Lifecycle of a download. `Finished` and `Failed` are terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DownloadState {
    Started,
    DestinationPending,
    DestinationChosen,
    Receiving,
    Finished,
    Failed(String),
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadState::Finished | DownloadState::Failed(_))
    }
}

/// One row of the downloads list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    pub id: String,
    pub source_uri: String,
    pub context_id: Option<ContextId>,
    pub suggested_filename: Option<String>,
    /// Assigned once, never changed afterwards.
    pub destination: Option<PathBuf>,
    pub received_bytes: u64,
    pub expected_bytes: Option<u64>,
    pub state: DownloadState,
    pub started_at: i64,
    pub completed_at: Option<i64>,
}

impl Download {
    /// Fraction in `[0, 1]` when the expected length is known.
    pub fn progress(&self) -> Option<f64> {
        match self.expected_bytes {
            Some(0) | None => None,
            Some(total) => Some((self.received_bytes as f64 / total as f64).min(1.0)),
        }
    }

    /// Text for the status column of the row.
    pub fn status_text(&self) -> String {
        match &self.state {
            DownloadState::Started | DownloadState::DestinationPending => {
                "Waiting for destination".to_string()
            }
            DownloadState::DestinationChosen => "Starting".to_string(),
            DownloadState::Receiving => match self.expected_bytes {
                Some(total) if total > 0 => format!(
                    "{} / {} ({}%)",
                    format_bytes(self.received_bytes),
                    format_bytes(total),
                    (self.progress().unwrap_or(0.0) * 100.0).floor() as u64
                ),
                _ => format_bytes(self.received_bytes),
            },
            DownloadState::Finished => {
                format!("Finished ({})", format_bytes(self.received_bytes))
            }
            DownloadState::Failed(reason) => format!("Failed: {}", reason),
        }
    }
}

/// Human-readable byte count with binary prefixes.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
