use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("No frontmost application")]
    NoFrontmostApp,

    #[error("Frontmost application has no capturable window")]
    NoCapturableWindow,

    #[error("No display found")]
    NoDisplay,

    #[error("Region selection was cancelled")]
    SelectionCancelled,

    #[error("Screen query failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("Screen recording permission denied")]
    PermissionDenied,

    #[error("Capture stream setup failed: {0}")]
    StreamSetupFailed(String),

    #[error("No frame received within {0:?}")]
    CaptureTimeout(Duration),

    #[error("Malformed frame: {0}")]
    InvalidFrame(String),
}

impl CaptureError {
    /// Map a backend error message onto the capture taxonomy
    pub fn from_backend(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("not authorized") || lower.contains("denied")
        {
            CaptureError::PermissionDenied
        } else {
            CaptureError::StreamSetupFailed(message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Invalid hotkey '{binding}': {reason}")]
    InvalidBinding { binding: String, reason: String },

    #[error("Hotkey registration failed: {0}")]
    Registration(#[from] global_hotkey::Error),
}
