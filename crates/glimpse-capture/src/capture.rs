use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use glimpse_types::Rect;
use xcap::{Monitor, Window, XCapResult};

use crate::backend::{
    DisplayId, DisplayInfo, FrameStream, ProcessId, ScreenSource, StreamFactory, WindowId,
    WindowInfo,
};
use crate::error::CaptureError;
use crate::frame::{Frame, FrameSlot, PixelFormat, StreamConfig};
use crate::target::CaptureTarget;

/// System processes that are never a capture target
const NON_APP_OWNERS: &[&str] = &[
    "Window Server",
    "Dock",
    "SystemUIServer",
    "Control Center",
    "Notification Center",
];

/// Screen source and stream factory backed by xcap
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapBackend;

impl XcapBackend {
    pub fn new() -> Self {
        Self
    }
}

fn window_info(w: &Window) -> XCapResult<WindowInfo> {
    Ok(WindowInfo {
        id: w.id()?,
        process_id: w.pid()?,
        app_name: w.app_name()?,
        title: w.title()?,
        bounds: Rect::new(
            w.x()? as f64,
            w.y()? as f64,
            w.width()? as f64,
            w.height()? as f64,
        ),
        layer: w.z()?,
        minimized: w.is_minimized()?,
    })
}

fn display_info(m: &Monitor) -> XCapResult<DisplayInfo> {
    Ok(DisplayInfo {
        id: m.id()?,
        bounds: Rect::new(
            m.x()? as f64,
            m.y()? as f64,
            m.width()? as f64,
            m.height()? as f64,
        ),
        scale_factor: m.scale_factor()? as f64,
        is_primary: m.is_primary()?,
    })
}

impl ScreenSource for XcapBackend {
    fn windows(&self) -> Result<Vec<WindowInfo>> {
        let windows = Window::all().context("Failed to enumerate windows")?;
        Ok(windows
            .iter()
            .filter_map(|w| match window_info(w) {
                Ok(info) => Some(info),
                Err(e) => {
                    // Windows can close mid-enumeration
                    tracing::debug!("Skipping window: {}", e);
                    None
                }
            })
            .filter(|w| !w.minimized)
            .collect())
    }

    fn displays(&self) -> Result<Vec<DisplayInfo>> {
        let monitors = Monitor::all().context("Failed to get monitors")?;
        monitors
            .iter()
            .map(|m| display_info(m).context("Failed to read monitor"))
            .collect()
    }

    /// Owner of the focused window, unless that window is ours
    fn frontmost_process(&self) -> Option<ProcessId> {
        let own_pid = std::process::id();
        let windows = match Window::all() {
            Ok(windows) => windows,
            Err(e) => {
                tracing::warn!("Frontmost lookup failed: {}", e);
                return None;
            }
        };

        let candidates = windows.iter().filter_map(|w| {
            Some(FocusCandidate {
                focused: w.is_focused().ok()?,
                process_id: w.pid().ok()?,
                app_name: w.app_name().unwrap_or_default(),
            })
        });
        focused_app(candidates, own_pid)
    }
}

struct FocusCandidate {
    process_id: ProcessId,
    app_name: String,
    focused: bool,
}

fn focused_app(
    candidates: impl IntoIterator<Item = FocusCandidate>,
    own_pid: ProcessId,
) -> Option<ProcessId> {
    candidates
        .into_iter()
        .find(|c| {
            c.focused
                && c.process_id != own_pid
                && !NON_APP_OWNERS.contains(&c.app_name.as_str())
        })
        .map(|c| c.process_id)
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Window(WindowId),
    Monitor(DisplayId),
}

impl StreamFactory for XcapBackend {
    fn open(
        &self,
        target: &CaptureTarget,
        config: &StreamConfig,
    ) -> Result<Box<dyn FrameStream>, CaptureError> {
        let source = match target {
            CaptureTarget::ActiveWindow { window_id, .. } => {
                find_window(*window_id)?;
                Source::Window(*window_id)
            }
            CaptureTarget::Display { display_id, .. }
            | CaptureTarget::Region { display_id, .. } => {
                find_monitor(*display_id)?;
                Source::Monitor(*display_id)
            }
        };

        tracing::debug!(
            "Opening {:?} stream over {:?} (cursor: {})",
            source,
            config.source_rect,
            config.shows_cursor
        );

        Ok(Box::new(XcapStream {
            source,
            stopped: Arc::new(AtomicBool::new(false)),
            worker: None,
        }))
    }
}

fn find_window(id: WindowId) -> Result<Window, CaptureError> {
    Window::all()
        .map_err(|e| CaptureError::from_backend(e.to_string()))?
        .into_iter()
        .find(|w| w.id().ok() == Some(id))
        .ok_or_else(|| CaptureError::StreamSetupFailed(format!("window {id} is gone")))
}

fn find_monitor(id: DisplayId) -> Result<Monitor, CaptureError> {
    Monitor::all()
        .map_err(|e| CaptureError::from_backend(e.to_string()))?
        .into_iter()
        .find(|m| m.id().ok() == Some(id))
        .ok_or_else(|| CaptureError::StreamSetupFailed(format!("display {id} is gone")))
}

/// One-shot stream: a delivery thread grabs a single frame into the slot
struct XcapStream {
    source: Source,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FrameStream for XcapStream {
    fn start(&mut self, slot: FrameSlot) -> Result<(), CaptureError> {
        let source = self.source;
        let stopped = self.stopped.clone();

        let worker = std::thread::Builder::new()
            .name("glimpse-frame-delivery".into())
            .spawn(move || {
                let captured = match source {
                    Source::Window(id) => find_window(id).and_then(|w| {
                        w.capture_image()
                            .map_err(|e| CaptureError::from_backend(e.to_string()))
                    }),
                    Source::Monitor(id) => find_monitor(id).and_then(|m| {
                        m.capture_image()
                            .map_err(|e| CaptureError::from_backend(e.to_string()))
                    }),
                };

                if stopped.load(Ordering::SeqCst) {
                    return;
                }

                match captured {
                    Ok(image) => {
                        slot.deliver(Frame {
                            width: image.width(),
                            height: image.height(),
                            format: PixelFormat::Rgba8,
                            data: image.into_raw(),
                        });
                    }
                    Err(e) => {
                        slot.fail(e);
                    }
                }
            })
            .map_err(|e| CaptureError::StreamSetupFailed(e.to_string()))?;

        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        // A capture in progress cannot be interrupted; let the thread finish on its own
        if let Some(worker) = self.worker.take()
            && worker.is_finished()
        {
            let _ = worker.join();
        }
    }
}

/// Titles of visible windows, for diagnostics
pub fn list_windows() -> Result<Vec<(u32, String)>> {
    let windows = Window::all().context("Failed to enumerate windows")?;
    Ok(windows
        .iter()
        .filter_map(|w| window_info(w).ok())
        .filter(|w| !w.title.is_empty() && !w.minimized)
        .map(|w| (w.id, format!("{} - {}", w.app_name, w.title)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(process_id: ProcessId, app_name: &str, focused: bool) -> FocusCandidate {
        FocusCandidate {
            process_id,
            app_name: app_name.to_string(),
            focused,
        }
    }

    #[test]
    fn test_focused_window_wins_over_stacking() {
        let windows = vec![
            candidate(11, "Finder", false),
            candidate(22, "Safari", true),
            candidate(33, "Mail", false),
        ];
        assert_eq!(focused_app(windows, 1), Some(22));
    }

    #[test]
    fn test_own_and_system_windows_are_not_frontmost() {
        let windows = vec![candidate(1, "glimpse", true), candidate(5, "Dock", true)];
        assert_eq!(focused_app(windows, 1), None);
    }

    #[test]
    fn test_nothing_focused() {
        let windows = vec![candidate(11, "Finder", false)];
        assert_eq!(focused_app(windows, 1), None);
    }
}
