use glimpse_types::CaptureMode;

use crate::backend::{DisplayInfo, ProcessId, ScreenSource, WindowInfo};
use crate::error::ResolutionError;
use crate::target::CaptureTarget;

/// Turn a capture mode into a concrete target against the current screen state.
///
/// Nothing is locked: windows may move or close before the capture starts.
pub fn resolve(
    source: &dyn ScreenSource,
    mode: CaptureMode,
) -> Result<CaptureTarget, ResolutionError> {
    match mode {
        CaptureMode::ActiveWindow => {
            let pid = source
                .frontmost_process()
                .ok_or(ResolutionError::NoFrontmostApp)?;
            let windows = source
                .windows()
                .map_err(|e| ResolutionError::Backend(e.to_string()))?;
            let window =
                topmost_window_of(windows, pid).ok_or(ResolutionError::NoCapturableWindow)?;

            tracing::debug!(
                "Resolved window {} of '{}' ({}x{})",
                window.id,
                window.app_name,
                window.bounds.width,
                window.bounds.height
            );

            Ok(CaptureTarget::ActiveWindow {
                process_id: pid,
                window_id: window.id,
                bounds: window.bounds,
            })
        }
        CaptureMode::Display => {
            let display = primary_display(source)?;
            Ok(CaptureTarget::Display {
                display_id: display.id,
                bounds: display.bounds,
            })
        }
        CaptureMode::Region(selection) => {
            if selection.is_zero() {
                return Err(ResolutionError::SelectionCancelled);
            }
            let display = primary_display(source)?;
            Ok(CaptureTarget::Region {
                display_id: display.id,
                display_bounds: display.bounds,
                selection,
            })
        }
    }
}

/// Highest-layer window with a visible area owned by `pid`; ties keep the first seen
fn topmost_window_of(windows: Vec<WindowInfo>, pid: ProcessId) -> Option<WindowInfo> {
    windows
        .into_iter()
        .filter(|w| w.process_id == pid && !w.bounds.is_empty())
        .fold(None, |best: Option<WindowInfo>, w| match best {
            Some(b) if b.layer >= w.layer => Some(b),
            _ => Some(w),
        })
}

pub fn primary_display(source: &dyn ScreenSource) -> Result<DisplayInfo, ResolutionError> {
    let displays = source
        .displays()
        .map_err(|e| ResolutionError::Backend(e.to_string()))?;

    let primary = displays.iter().position(|d| d.is_primary).unwrap_or(0);
    displays
        .into_iter()
        .nth(primary)
        .ok_or(ResolutionError::NoDisplay)
}
