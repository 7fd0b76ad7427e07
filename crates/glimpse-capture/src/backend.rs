use anyhow::Result;
pub use glimpse_types::ProcessId;
use glimpse_types::Rect;

use crate::error::CaptureError;
use crate::frame::{FrameSlot, StreamConfig};
use crate::target::CaptureTarget;

pub type WindowId = u32;
pub type DisplayId = u32;

/// An on-screen window as reported by the OS
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub process_id: ProcessId,
    pub app_name: String,
    pub title: String,
    /// Bounds in global screen points
    pub bounds: Rect,
    /// Stacking layer, higher is closer to the viewer
    pub layer: i32,
    pub minimized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    pub id: DisplayId,
    pub bounds: Rect,
    pub scale_factor: f64,
    pub is_primary: bool,
}

/// Read-only view of the current window and display state
pub trait ScreenSource: Send + Sync {
    fn windows(&self) -> Result<Vec<WindowInfo>>;

    fn displays(&self) -> Result<Vec<DisplayInfo>>;

    /// Process owning the focused application, if known
    fn frontmost_process(&self) -> Option<ProcessId>;
}

/// A capture stream that delivers frames into a slot from its own thread
pub trait FrameStream: Send {
    fn start(&mut self, slot: FrameSlot) -> Result<(), CaptureError>;

    /// Stop delivering. Must be safe to call more than once
    fn stop(&mut self);
}

pub trait StreamFactory: Send + Sync {
    fn open(
        &self,
        target: &CaptureTarget,
        config: &StreamConfig,
    ) -> Result<Box<dyn FrameStream>, CaptureError>;
}
