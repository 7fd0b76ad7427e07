use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use glimpse_capture::{FocusControl, HotkeyManager, ScreenSource};
use glimpse_config::hotkeys::REGION_CAPTURE_HOTKEY;
use glimpse_config::ui::UiConfig;
use glimpse_types::{AppEvent, WindowPosition};
use kanal::{AsyncReceiver, AsyncSender};
use slint::ComponentHandle;

mod events;
pub mod placement;
pub mod presentation;
pub mod selection;
mod state;

pub use presentation::{HotkeyDecision, PresentationState, ShowPlan};
pub use selection::{OverlayOutcome, Selection, SelectionState};

slint::include_modules!();

const HOTKEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything the UI thread needs from the outside world
pub struct UiContext {
    pub screens: Arc<dyn ScreenSource>,
    pub focus: Arc<dyn FocusControl>,
    pub window_binding: String,
    pub config: UiConfig,
    pub saved_position: Option<WindowPosition>,
}

/// Run the Slint event loop on the calling (main) thread until the backend
/// channel closes.
pub fn ui_loop(
    ctx: UiContext,
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    // Global hotkeys have to live on the event loop thread
    let hotkeys = HotkeyManager::new(&ctx.window_binding, REGION_CAPTURE_HOTKEY)?;
    let overlay = SelectionOverlay::new()?;

    let ui = Rc::new(state::UiState::new(
        overlay.clone_strong(),
        hotkeys,
        ctx.screens,
        ctx.focus,
        ctx.config,
        ctx.saved_position,
        ui_to_app_tx,
    ));
    events::wire_overlay(&ui, &overlay);

    // Backend events, applied in arrival order
    {
        let weak_ui = Rc::downgrade(&ui);
        slint::spawn_local(async move {
            while let Ok(event) = app_to_ui_rx.recv().await {
                let Some(ui) = weak_ui.upgrade() else {
                    break;
                };
                events::handle_event(&ui, event);
            }
            tracing::info!("[SLINT] Backend channel closed, leaving event loop");
            let _ = slint::quit_event_loop();
        })?;
    }

    // Hotkey polling
    let hotkey_timer = slint::Timer::default();
    {
        let weak_ui = Rc::downgrade(&ui);
        hotkey_timer.start(slint::TimerMode::Repeated, HOTKEY_POLL_INTERVAL, move || {
            let Some(ui) = weak_ui.upgrade() else {
                return;
            };
            loop {
                let action = ui.hotkeys.borrow().poll();
                match action {
                    Some(action) => events::handle_hotkey(&ui, action),
                    None => break,
                }
            }
        });
    }

    slint::run_event_loop_until_quit()?;

    hotkey_timer.stop();
    tracing::info!("[SLINT] Event loop finished");
    Ok(())
}
