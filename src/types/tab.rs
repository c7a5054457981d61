use serde::{Deserialize, Serialize};

use super::context::ContextId;

/// Placeholder label shown while a tab has neither title nor URI.
pub const EMPTY_TITLE: &str = "Empty Title";

/// Label given to freshly inserted tabs before the engine reports anything.
pub const NEW_TAB_TITLE: &str = "New tab";

/// Lifecycle of a tab. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TabState {
    Created,
    Active,
    Closing,
    Destroyed,
}

/// Why the engine's web process for a view went away.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TerminationReason {
    Crashed,
    ExceededMemoryLimit,
    /// Any other reason, including ones the engine adds later.
    Other(u32),
}

impl TerminationReason {
    /// Fixed label shown in place of the page title.
    pub fn label(&self) -> &'static str {
        match self {
            TerminationReason::Crashed => "Crashed",
            TerminationReason::ExceededMemoryLimit => "Out of Memory",
            TerminationReason::Other(_) => "Unknown Crash",
        }
    }
}

/// A tab: one engine view plus the chrome state around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub context_id: ContextId,
    /// Tab this one was opened from, if any.
    pub opener: Option<String>,
    pub title: Option<String>,
    pub uri: Option<String>,
    /// Text shown in the location entry.
    pub location: String,
    /// Text shown in the tab strip.
    pub label: String,
    pub playing_audio: bool,
    /// Location-entry progress fraction, 0 when idle.
    pub load_progress: f64,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Hovered link shown in the status bar.
    pub status_text: Option<String>,
    pub javascript_enabled: bool,
    pub auto_load_images: bool,
    pub zoom_level: f64,
    pub state: TabState,
    pub termination: Option<TerminationReason>,
    pub created_at: i64,
}

impl Tab {
    pub fn is_root(&self) -> bool {
        self.opener.is_none()
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    /// Whether callbacks may still touch this tab.
    pub fn is_live(&self) -> bool {
        matches!(self.state, TabState::Created | TabState::Active)
    }
}
