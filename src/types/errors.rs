use thiserror::Error;

// === TabError ===

/// Errors related to tab lifecycle operations.
#[derive(Debug, Error, PartialEq)]
pub enum TabError {
    /// Tab with the given ID was not found (never existed or already destroyed).
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// The tab is being torn down and accepts no further operations.
    #[error("Tab is closing: {0}")]
    Closing(String),
    /// The provided tab index is out of bounds.
    #[error("Invalid tab index: {0}")]
    InvalidIndex(usize),
}

// === DownloadError ===

/// Errors related to download bookkeeping.
#[derive(Debug, Error, PartialEq)]
pub enum DownloadError {
    /// Download with the given ID was not found.
    #[error("Download not found: {0}")]
    NotFound(String),
    /// The destination was already assigned.
    #[error("Download destination already chosen: {0}")]
    DestinationAlreadyChosen(String),
    /// Byte progress arrived before a destination was assigned.
    #[error("Download destination not chosen yet: {0}")]
    DestinationNotChosen(String),
    /// Received byte count would go backwards.
    #[error("Download progress regressed for {id}: {current} -> {attempted}")]
    ProgressRegressed { id: String, current: u64, attempted: u64 },
    /// The download already reached a terminal state.
    #[error("Download already terminated: {0}")]
    AlreadyTerminated(String),
}

// === KeybindingError ===

/// Errors related to keybinding management.
#[derive(Debug, Error, PartialEq)]
pub enum KeybindingError {
    /// No binding exists for the given action.
    #[error("Keybinding not found for action: {0}")]
    NotFound(String),
    /// The chord is already bound to another action in the same scope.
    #[error("Keybinding conflict: {0}")]
    Conflict(String),
    /// The chord string could not be parsed.
    #[error("Invalid key chord: {0}")]
    InvalidChord(String),
    /// The action name is not known.
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === FilterError ===

/// Errors reported by the content-filter store. Carries a numeric code like the engine's.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    /// The filter source or compiled store could not be read or written.
    #[error("Content filter I/O error [{code}]: {message}")]
    Io { code: i32, message: String },
    /// The source is not a valid rule list.
    #[error("Content filter parse error [{code}]: {message}")]
    Parse { code: i32, message: String },
    /// A trigger pattern failed to compile.
    #[error("Content filter invalid pattern [{code}]: {message}")]
    InvalidPattern { code: i32, message: String },
    /// No compiled filter exists under the identifier.
    #[error("Content filter not found: {0}")]
    NotFound(String),
}

impl FilterError {
    /// Numeric code, `-1` when none applies.
    pub fn code(&self) -> i32 {
        match self {
            FilterError::Io { code, .. }
            | FilterError::Parse { code, .. }
            | FilterError::InvalidPattern { code, .. } => *code,
            FilterError::NotFound(_) => -1,
        }
    }
}

// === UserscriptError ===

/// Errors related to userscript discovery.
#[derive(Debug, Error, PartialEq)]
pub enum UserscriptError {
    /// The glob pattern built from the scripts directory is invalid.
    #[error("Invalid userscript pattern: {0}")]
    InvalidPattern(String),
    /// A single script could not be read.
    #[error("Error reading userscript {path}: {message}")]
    Read { path: String, message: String },
}
