//! Download Manager for Lupine.
//!
//! Tracks downloads the engine performs: destination, byte progress and
//! terminal state. The engine does the transfer; this only keeps the books.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::types::context::ContextId;
use crate::types::download::{Download, DownloadState};
use crate::types::errors::DownloadError;
use crate::types::event::{DownloadEvent, Effect};

/// Trait defining download bookkeeping operations.
pub trait DownloadManagerTrait {
    fn start(&mut self, source_uri: &str, context_id: Option<ContextId>) -> String;
    fn request_destination(
        &mut self,
        id: &str,
        suggested_filename: Option<&str>,
    ) -> Result<(), DownloadError>;
    fn choose_destination(&mut self, id: &str, path: &Path) -> Result<(), DownloadError>;
    fn record_progress(
        &mut self,
        id: &str,
        received: u64,
        expected: Option<u64>,
    ) -> Result<(), DownloadError>;
    fn finish(&mut self, id: &str) -> Result<(), DownloadError>;
    fn fail(&mut self, id: &str, reason: &str) -> Result<(), DownloadError>;
    fn dismiss(&mut self, id: &str) -> Result<Download, DownloadError>;
    fn get(&self, id: &str) -> Option<&Download>;
    fn list(&self) -> Vec<&Download>;
}

/// In-memory download list, newest first.
pub struct DownloadManager {
    downloads: Vec<Download>,
}

impl DownloadManager {
    pub fn new() -> Self {
        Self { downloads: Vec::new() }
    }

    fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find_index(&self, id: &str) -> Result<usize, DownloadError> {
        self.downloads
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    /// Index of an entry that still accepts mutation.
    fn find_active(&self, id: &str) -> Result<usize, DownloadError> {
        let idx = self.find_index(id)?;
        if self.downloads[idx].state.is_terminal() {
            return Err(DownloadError::AlreadyTerminated(id.to_string()));
        }
        Ok(idx)
    }

    /// Applies one engine notification. Unknown ids are ignored; rejected
    /// updates are logged and leave the entry untouched.
    pub fn handle_event(&mut self, id: &str, event: DownloadEvent) -> Vec<Effect> {
        if self.get(id).is_none() {
            log::debug!("dropping {:?} for unknown download {}", event, id);
            return Vec::new();
        }

        let result = match event {
            DownloadEvent::DecideDestination { suggested_filename } => {
                self.request_destination(id, suggested_filename.as_deref())
            }
            DownloadEvent::CreatedDestination(path) => self.choose_destination(id, &path),
            DownloadEvent::ReceivedData { received, expected } => {
                self.record_progress(id, received, expected)
            }
            DownloadEvent::Finished => self.finish(id),
            DownloadEvent::Failed(reason) => self.fail(id, &reason),
        };

        match result {
            Ok(()) => vec![Effect::UpdateDownloadRow { download_id: id.to_string() }],
            Err(e) => {
                log::warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Downloads not yet finished or failed.
    pub fn active_count(&self) -> usize {
        self.downloads.iter().filter(|d| !d.state.is_terminal()).count()
    }

    /// Default destination for a download: the suggested name inside `dir`.
    pub fn default_destination(dir: &Path, download: &Download) -> PathBuf {
        let name = download
            .suggested_filename
            .as_deref()
            .filter(|n| !n.is_empty())
            .and_then(|n| Path::new(n).file_name())
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "download".into());
        dir.join(name)
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadManagerTrait for DownloadManager {
    fn start(&mut self, source_uri: &str, context_id: Option<ContextId>) -> String {
        let id = Uuid::new_v4().to_string();
        self.downloads.insert(
            0,
            Download {
                id: id.clone(),
                source_uri: source_uri.to_string(),
                context_id,
                suggested_filename: None,
                destination: None,
                received_bytes: 0,
                expected_bytes: None,
                state: DownloadState::Started,
                started_at: Self::now_ts(),
                completed_at: None,
            },
        );
        log::info!("download {} started: {}", id, source_uri);
        id
    }

    fn request_destination(
        &mut self,
        id: &str,
        suggested_filename: Option<&str>,
    ) -> Result<(), DownloadError> {
        let idx = self.find_active(id)?;
        let item = &mut self.downloads[idx];
        if item.destination.is_some() {
            return Err(DownloadError::DestinationAlreadyChosen(id.to_string()));
        }
        if let Some(name) = suggested_filename.filter(|n| !n.is_empty()) {
            item.suggested_filename = Some(name.to_string());
        }
        item.state = DownloadState::DestinationPending;
        Ok(())
    }

    fn choose_destination(&mut self, id: &str, path: &Path) -> Result<(), DownloadError> {
        let idx = self.find_active(id)?;
        let item = &mut self.downloads[idx];
        if item.destination.is_some() {
            return Err(DownloadError::DestinationAlreadyChosen(id.to_string()));
        }
        item.destination = Some(path.to_path_buf());
        item.state = DownloadState::DestinationChosen;
        log::debug!("download {} saving to {}", id, path.display());
        Ok(())
    }

    fn record_progress(
        &mut self,
        id: &str,
        received: u64,
        expected: Option<u64>,
    ) -> Result<(), DownloadError> {
        let idx = self.find_active(id)?;
        let item = &mut self.downloads[idx];
        if item.destination.is_none() {
            return Err(DownloadError::DestinationNotChosen(id.to_string()));
        }
        if received < item.received_bytes {
            return Err(DownloadError::ProgressRegressed {
                id: id.to_string(),
                current: item.received_bytes,
                attempted: received,
            });
        }
        item.received_bytes = received;
        if expected.is_some() {
            item.expected_bytes = expected;
        }
        item.state = DownloadState::Receiving;
        Ok(())
    }

    fn finish(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_active(id)?;
        let item = &mut self.downloads[idx];
        if item.destination.is_none() {
            return Err(DownloadError::DestinationNotChosen(id.to_string()));
        }
        item.state = DownloadState::Finished;
        item.completed_at = Some(Self::now_ts());
        log::info!("download {} finished ({} bytes)", id, item.received_bytes);
        Ok(())
    }

    /// Works from any non-terminal state, including before a destination exists.
    fn fail(&mut self, id: &str, reason: &str) -> Result<(), DownloadError> {
        let idx = self.find_active(id)?;
        let item = &mut self.downloads[idx];
        item.state = DownloadState::Failed(reason.to_string());
        item.completed_at = Some(Self::now_ts());
        log::warn!("download {} failed: {}", id, reason);
        Ok(())
    }

    fn dismiss(&mut self, id: &str) -> Result<Download, DownloadError> {
        let idx = self.find_index(id)?;
        Ok(self.downloads.remove(idx))
    }

    fn get(&self, id: &str) -> Option<&Download> {
        self.downloads.iter().find(|d| d.id == id)
    }

    fn list(&self) -> Vec<&Download> {
        self.downloads.iter().collect()
    }
}
