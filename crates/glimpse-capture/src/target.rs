use glimpse_types::Rect;

use crate::backend::{DisplayId, ProcessId, WindowId};

/// What a single capture reads pixels from
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureTarget {
    ActiveWindow {
        process_id: ProcessId,
        window_id: WindowId,
        bounds: Rect,
    },
    Display {
        display_id: DisplayId,
        bounds: Rect,
    },
    /// The whole display is captured, then cropped to `selection`
    Region {
        display_id: DisplayId,
        display_bounds: Rect,
        selection: Rect,
    },
}

impl CaptureTarget {
    /// Area covered by the capture stream, in global screen points
    pub fn bounds(&self) -> Rect {
        match self {
            CaptureTarget::ActiveWindow { bounds, .. } => *bounds,
            CaptureTarget::Display { bounds, .. } => *bounds,
            CaptureTarget::Region { display_bounds, .. } => *display_bounds,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CaptureTarget::ActiveWindow { .. } => "window",
            CaptureTarget::Display { .. } => "display",
            CaptureTarget::Region { .. } => "region",
        }
    }
}
