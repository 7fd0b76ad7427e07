pub mod geometry;
pub mod types;

pub use geometry::{Point, Rect, Size, WindowPosition};
pub use types::{AnalysisOutcome, AppEvent, CaptureMode, ProcessId, SessionId, Thumbnail};
