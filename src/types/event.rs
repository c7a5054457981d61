use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::keys::{Modifiers, PointerButton};
use super::tab::TerminationReason;

/// A navigation the engine asks permission for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationRequest {
    pub uri: String,
    pub modifiers: Modifiers,
    pub mouse_button: Option<PointerButton>,
}

impl NavigationRequest {
    pub fn plain(uri: &str) -> Self {
        Self { uri: uri.to_string(), modifiers: Modifiers::NONE, mouse_button: None }
    }
}

/// A response the engine asks how to handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseInfo {
    pub uri: String,
    pub mime_type: Option<String>,
    /// Whether the engine can display this MIME type itself.
    pub mime_type_supported: bool,
}

/// Certificate validation failures, mirroring the engine's flag set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsErrors {
    pub unknown_ca: bool,
    pub bad_identity: bool,
    pub not_activated: bool,
    pub expired: bool,
    pub revoked: bool,
    pub insecure: bool,
    pub generic_error: bool,
}

impl TlsErrors {
    /// Multi-line explanation shown below the dialog headline.
    pub fn describe(&self) -> String {
        let mut text = String::from(
            "Couldn't verify the TLS certificate to ensure a better security of the \
             connection. You might want to verify your machine and network.\n\n",
        );
        let lines = [
            (self.unknown_ca, "Error: The X509 Certificate Authority is unknown.\n"),
            (self.bad_identity, "Error: The given identity doesn't match the expected one.\n"),
            (
                self.not_activated,
                "Error: The certificate isn't valid yet. Check your system's clock.\n",
            ),
            (self.expired, "Error: The certificate has expired. Check your system's clock.\n"),
            (self.revoked, "Error: The certificate has been revoked.\n"),
            (self.insecure, "Error: The certificate is considered to be insecure.\n"),
            (
                self.generic_error,
                "Error: Some unknown error occurred validating the certificate.\n",
            ),
        ];
        for (set, line) in lines {
            if set {
                text.push_str(line);
            }
        }
        text
    }
}

/// Events emitted by an engine view, delivered to the tab that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EngineEvent {
    UriChanged(Option<String>),
    TitleChanged(Option<String>),
    LoadProgress(f64),
    LoadChanged { can_go_back: bool, can_go_forward: bool },
    AudioStateChanged(bool),
    MouseTargetChanged(Option<String>),
    ProcessTerminated(TerminationReason),
    /// The page asked for a new view (`window.open`, `target="_blank"`).
    PopupRequested { uri: Option<String> },
    /// The page called `window.close()`.
    CloseRequested,
    NavigationDecision(NavigationRequest),
    ResponseDecision(ResponseInfo),
    DownloadStarted { uri: String, suggested_filename: Option<String> },
    TlsError { failing_uri: String, errors: TlsErrors },
}

/// Events emitted for one download, addressed by download id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DownloadEvent {
    DecideDestination { suggested_filename: Option<String> },
    CreatedDestination(PathBuf),
    ReceivedData { received: u64, expected: Option<u64> },
    Finished,
    Failed(String),
}

/// Answer to a navigation or response decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PolicyDecision {
    /// Let the engine do whatever it does by default.
    Default,
    /// Display the response.
    Use,
    /// Drop the request; something else handles it.
    Ignore,
    /// Turn the response into a download.
    Download,
}

/// Choice made in the TLS exception dialog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TlsChoice {
    TrustHost,
    Cancel,
}

/// Instructions for the UI shell, produced by state changes in the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Effect {
    LoadUri { tab_id: String, uri: String },
    GoBack { tab_id: String },
    GoForward { tab_id: String },
    Reload { tab_id: String, bypass_cache: bool },
    StopLoading { tab_id: String },
    Print { tab_id: String },
    SetZoom { tab_id: String, level: f64 },
    SetJavascript { tab_id: String, enabled: bool },
    SetAutoLoadImages { tab_id: String, enabled: bool },
    Find { tab_id: String, text: String },
    FindNext { tab_id: String },
    FindPrevious { tab_id: String },
    FindFinish { tab_id: String },
    SetTabLabel { tab_id: String, label: String, context_tag: String },
    SetLocation { tab_id: String, text: String },
    SetProgress { tab_id: String, fraction: f64 },
    SetStatus { tab_id: String, text: Option<String> },
    SetAudioIndicator { tab_id: String, playing: bool },
    SetNavigationSensitivity { tab_id: String, can_go_back: bool, can_go_forward: bool },
    SetWindowTitle(String),
    InsertTab { tab_id: String, position: usize },
    SwitchTo { tab_id: String },
    DestroyTab { tab_id: String },
    FocusLocation { tab_id: String },
    FocusSearch { tab_id: String },
    Decide(PolicyDecision),
    PromptTlsException {
        tab_id: String,
        failing_uri: String,
        host: Option<String>,
        details: String,
    },
    AllowCertificateForHost { tab_id: String, host: String },
    UpdateDownloadRow { download_id: String },
    RemoveDownloadRow { download_id: String },
    Quit,
}
