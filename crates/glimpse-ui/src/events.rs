use std::rc::Rc;

use glimpse_capture::HotkeyAction;
use glimpse_types::{
    AnalysisOutcome, AppEvent, CaptureMode, Point, ProcessId, SessionId, Size, Thumbnail,
    WindowPosition,
};
use slint::{ComponentHandle, LogicalPosition, LogicalSize, Rgba8Pixel, SharedPixelBuffer};

use crate::placement;
use crate::presentation::HotkeyDecision;
use crate::selection::{OverlayOutcome, size_label};
use crate::state::UiState;
use crate::{AnalysisWindow, SelectionOverlay};

/// Apply one backend event on the UI thread
pub fn handle_event(ui: &Rc<UiState>, event: AppEvent) {
    match event {
        AppEvent::CaptureReady {
            session,
            thumbnail,
            saved_to,
            previous_focus,
        } => {
            if let Some(path) = &saved_to {
                tracing::debug!("[SLINT] Capture {} saved to {}", session, path.display());
            }
            show_capture(ui, session, &thumbnail, previous_focus);
        }
        AppEvent::OpenOverlay { previous_focus } => open_overlay(ui, previous_focus),
        AppEvent::AnalysisDelta { session, text } => {
            let mut presentation = ui.presentation.borrow_mut();
            if presentation.apply_delta(session, &text)
                && let Some(w) = ui.window.borrow().as_ref()
            {
                w.set_response_text(presentation.text().into());
            }
        }
        AppEvent::AnalysisFinished { session, outcome } => {
            if let AnalysisOutcome::Failed { message } = &outcome {
                tracing::debug!("[SLINT] Analysis {} failed: {}", session, message);
            }
            let mut presentation = ui.presentation.borrow_mut();
            if presentation.finish(session, &outcome)
                && let Some(w) = ui.window.borrow().as_ref()
            {
                w.set_status_text(presentation.status().into());
                w.set_alert_text(presentation.alert().unwrap_or_default().into());
            }
        }
        AppEvent::StatusUpdate { status, capturing } => {
            tracing::debug!("[SLINT] Status: {} (capturing: {})", status, capturing);
            if ui.presentation.borrow().is_visible()
                && let Some(w) = ui.window.borrow().as_ref()
            {
                w.set_status_text(status.into());
            }
        }
        AppEvent::RebindHotkey(binding) => {
            if let Err(e) = ui.hotkeys.borrow_mut().rebind_window_capture(&binding) {
                tracing::error!("Failed to rebind window capture hotkey: {}", e);
            }
        }
        AppEvent::BackendReady => {
            tracing::info!("[SLINT] Backend ready");
        }
        _ => {}
    }
}

pub fn handle_hotkey(ui: &Rc<UiState>, action: HotkeyAction) {
    tracing::debug!("[SLINT] Hotkey: {:?}", action);
    match action {
        HotkeyAction::CaptureWindow => {
            if ui.overlay_open.get() {
                return;
            }
            let decision = ui.presentation.borrow().window_hotkey();
            match decision {
                HotkeyDecision::Dismiss => dismiss(ui),
                HotkeyDecision::Capture => {
                    ui.send(AppEvent::Capture(CaptureMode::ActiveWindow));
                }
            }
        }
        HotkeyAction::CaptureRegion => {
            if !ui.overlay_open.get() {
                ui.send(AppEvent::RequestRegion);
            }
        }
        HotkeyAction::Escape => {
            if ui.overlay_open.get() {
                let outcome = ui.selection.borrow_mut().cancel();
                close_overlay(ui, outcome);
            }
        }
    }
}

fn show_capture(
    ui: &Rc<UiState>,
    session: SessionId,
    thumbnail: &Thumbnail,
    previous_focus: Option<ProcessId>,
) {
    let plan = ui
        .presentation
        .borrow_mut()
        .capture_ready(session, previous_focus);

    if plan.create {
        match AnalysisWindow::new() {
            Ok(w) => {
                wire_window(ui, &w);
                *ui.window.borrow_mut() = Some(w);
                tracing::debug!("[SLINT] Analysis window created");
            }
            Err(e) => {
                tracing::error!("Failed to create analysis window: {}", e);
                return;
            }
        }
    }

    let window = ui.window.borrow();
    let Some(w) = window.as_ref() else {
        return;
    };

    w.set_thumbnail(to_image(thumbnail));
    w.set_response_text("".into());
    w.set_alert_text("".into());
    w.set_status_text(ui.presentation.borrow().status().into());

    if plan.place {
        place_window(ui, w);
    }
    if let Err(e) = w.show() {
        tracing::error!("Failed to show analysis window: {}", e);
    }
}

fn to_image(thumbnail: &Thumbnail) -> slint::Image {
    let buffer = SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
        &thumbnail.rgba[..],
        thumbnail.width,
        thumbnail.height,
    );
    slint::Image::from_rgba8(buffer)
}

fn place_window(ui: &UiState, w: &AnalysisWindow) {
    let displays = ui.screens.displays().unwrap_or_else(|e| {
        tracing::warn!("Display lookup failed, using default placement: {}", e);
        Vec::new()
    });
    let size = Size::new(ui.config.window_width, ui.config.window_height);
    let pos = placement::resolve_position(ui.position.get(), size, &displays, ui.config.bottom_margin);

    let window = w.window();
    window.set_size(LogicalSize::new(size.width as f32, size.height as f32));
    window.set_position(LogicalPosition::new(pos.x as f32, pos.y as f32));
}

fn window_position(w: &AnalysisWindow) -> WindowPosition {
    let window = w.window();
    let pos = window.position().to_logical(window.scale_factor());
    WindowPosition {
        x: pos.x as f64,
        y: pos.y as f64,
    }
}

fn wire_window(ui: &Rc<UiState>, w: &AnalysisWindow) {
    let weak_ui = Rc::downgrade(ui);
    w.on_close_requested(move || {
        if let Some(ui) = weak_ui.upgrade() {
            dismiss(&ui);
        }
    });

    let weak_window = w.as_weak();
    w.on_drag_by(move |dx, dy| {
        if let Some(w) = weak_window.upgrade() {
            let pos = window_position(&w);
            w.window().set_position(LogicalPosition::new(
                pos.x as f32 + dx,
                pos.y as f32 + dy,
            ));
        }
    });

    let weak_ui = Rc::downgrade(ui);
    let weak_window = w.as_weak();
    w.on_drag_ended(move || {
        if let (Some(ui), Some(w)) = (weak_ui.upgrade(), weak_window.upgrade()) {
            let pos = window_position(&w);
            ui.position.set(Some(pos));
            ui.send(AppEvent::WindowMoved(pos));
        }
    });
}

/// Hide the window, hand focus back and stop the running analysis
fn dismiss(ui: &UiState) {
    let previous = ui.presentation.borrow_mut().dismiss();
    if let Some(w) = ui.window.borrow().as_ref()
        && let Err(e) = w.hide()
    {
        tracing::warn!("Failed to hide analysis window: {}", e);
    }
    ui.send(AppEvent::WindowClosed);

    if let Some(pid) = previous
        && let Err(e) = ui.focus.activate(pid)
    {
        tracing::warn!("Could not restore focus to {}: {}", pid, e);
    }
}

pub fn wire_overlay(ui: &Rc<UiState>, overlay: &SelectionOverlay) {
    let weak_ui = Rc::downgrade(ui);
    overlay.on_pressed(move |x, y| {
        if let Some(ui) = weak_ui.upgrade() {
            ui.selection
                .borrow_mut()
                .press(Point::new(x as f64, y as f64));
            sync_overlay(&ui);
        }
    });

    let weak_ui = Rc::downgrade(ui);
    overlay.on_dragged(move |x, y| {
        if let Some(ui) = weak_ui.upgrade() {
            ui.selection
                .borrow_mut()
                .drag(Point::new(x as f64, y as f64));
            sync_overlay(&ui);
        }
    });

    let weak_ui = Rc::downgrade(ui);
    overlay.on_released(move |x, y| {
        if let Some(ui) = weak_ui.upgrade() {
            let outcome = ui
                .selection
                .borrow_mut()
                .release(Point::new(x as f64, y as f64));
            match outcome {
                Some(outcome) => close_overlay(&ui, outcome),
                None => sync_overlay(&ui),
            }
        }
    });

    let weak_ui = Rc::downgrade(ui);
    overlay.on_cancel_requested(move || {
        if let Some(ui) = weak_ui.upgrade() {
            let outcome = ui.selection.borrow_mut().cancel();
            close_overlay(&ui, outcome);
        }
    });
}

fn sync_overlay(ui: &UiState) {
    let selection = ui.selection.borrow();
    let overlay = &ui.overlay;

    match selection.rect() {
        Some(rect) if !selection.shows_instructions() => {
            overlay.set_dragging(true);
            overlay.set_sel_x(rect.x as f32);
            overlay.set_sel_y(rect.y as f32);
            overlay.set_sel_width(rect.width as f32);
            overlay.set_sel_height(rect.height as f32);
            overlay.set_size_label(size_label(&rect).into());
        }
        _ => overlay.set_dragging(false),
    }
}

fn open_overlay(ui: &UiState, previous_focus: Option<ProcessId>) {
    if ui.overlay_open.replace(true) {
        return;
    }

    ui.selection.borrow_mut().reset();
    ui.presentation.borrow_mut().remember_focus(previous_focus);
    sync_overlay(ui);

    if let Err(e) = ui.hotkeys.borrow_mut().watch_escape() {
        tracing::warn!("Global Escape unavailable, overlay needs focus to cancel: {}", e);
    }

    ui.overlay.window().set_fullscreen(true);
    if let Err(e) = ui.overlay.show() {
        tracing::error!("Failed to show selection overlay: {}", e);
        ui.hotkeys.borrow_mut().release_escape();
        ui.overlay_open.set(false);
        return;
    }
    ui.overlay.invoke_focus_input();
}

/// Escape registration goes first so it never outlives the overlay
fn close_overlay(ui: &UiState, outcome: OverlayOutcome) {
    if !ui.overlay_open.replace(false) {
        return;
    }

    ui.hotkeys.borrow_mut().release_escape();
    if let Err(e) = ui.overlay.hide() {
        tracing::warn!("Failed to hide selection overlay: {}", e);
    }

    tracing::debug!("[SLINT] Selection finished: {:?}", outcome);
    ui.send(AppEvent::Capture(CaptureMode::Region(outcome.into_rect())));
}
