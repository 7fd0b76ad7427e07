use std::cell::{Cell, RefCell};
use std::sync::Arc;

use glimpse_capture::{FocusControl, HotkeyManager, ScreenSource};
use glimpse_config::ui::UiConfig;
use glimpse_types::{AppEvent, WindowPosition};
use kanal::AsyncSender;

use crate::presentation::PresentationState;
use crate::selection::Selection;
use crate::{AnalysisWindow, SelectionOverlay};

/// UI-thread state (separate from the backend's AppState)
pub struct UiState {
    pub presentation: RefCell<PresentationState>,
    pub selection: RefCell<Selection>,
    pub hotkeys: RefCell<HotkeyManager>,
    pub overlay: SelectionOverlay,
    pub overlay_open: Cell<bool>,
    /// Created on the first capture, then reused
    pub window: RefCell<Option<AnalysisWindow>>,
    pub position: Cell<Option<WindowPosition>>,
    pub screens: Arc<dyn ScreenSource>,
    pub focus: Arc<dyn FocusControl>,
    pub config: UiConfig,
    to_app: AsyncSender<AppEvent>,
}

impl UiState {
    pub fn new(
        overlay: SelectionOverlay,
        hotkeys: HotkeyManager,
        screens: Arc<dyn ScreenSource>,
        focus: Arc<dyn FocusControl>,
        config: UiConfig,
        saved_position: Option<WindowPosition>,
        to_app: AsyncSender<AppEvent>,
    ) -> Self {
        Self {
            presentation: RefCell::new(PresentationState::new()),
            selection: RefCell::new(Selection::new()),
            hotkeys: RefCell::new(hotkeys),
            overlay,
            overlay_open: Cell::new(false),
            window: RefCell::new(None),
            position: Cell::new(saved_position),
            screens,
            focus,
            config,
            to_app,
        }
    }

    /// Queue an event for the backend without blocking the event loop
    pub fn send(&self, event: AppEvent) {
        match self.to_app.try_send(event) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Backend queue full, dropping UI event"),
            Err(e) => tracing::error!("Backend channel closed: {}", e),
        }
    }
}
