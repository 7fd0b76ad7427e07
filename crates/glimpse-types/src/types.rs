use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Rect, WindowPosition};

pub type ProcessId = u32;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Start a capture; supersedes whatever session is in flight
    Capture(CaptureMode),
    /// Region hotkey pressed; the backend answers with `OpenOverlay`
    RequestRegion,
    /// Show the selection overlay. Carries the app focused before it
    OpenOverlay {
        previous_focus: Option<ProcessId>,
    },
    /// The floating window was dismissed
    WindowClosed,
    /// The floating window was dragged to a new place
    WindowMoved(WindowPosition),
    ConfigUpdate {
        field: String,
        value: String,
    },
    BackendReady,
    /// Replace the window-capture hotkey binding
    RebindHotkey(String),
    CaptureReady {
        session: SessionId,
        thumbnail: Thumbnail,
        saved_to: Option<PathBuf>,
        /// App to re-activate when the window is dismissed
        previous_focus: Option<ProcessId>,
    },
    AnalysisDelta {
        session: SessionId,
        text: String,
    },
    AnalysisFinished {
        session: SessionId,
        outcome: AnalysisOutcome,
    },
    StatusUpdate {
        status: String,
        capturing: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureMode {
    ActiveWindow,
    Display,
    /// Selection in primary-display points, top-left origin
    Region(Rect),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed,
    Failed { message: String },
    Cancelled,
}

/// Opaque per-capture token used to drop deltas from superseded sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// RGBA8 pixels of a captured bitmap, shared with the UI thread
#[derive(Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}
