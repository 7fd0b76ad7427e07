use kanal::AsyncReceiver;
use glimpse_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::context::CaptureContext;
use crate::profile;

pub mod capture;
pub mod config_update;

use capture::{request_region, start_capture};
use config_update::handle_config_update;

/// App's main loop
pub async fn event_loop(
    ctx: CaptureContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    ctx.notify(AppEvent::BackendReady).await;

    tracing::info!("[EVENT_LOOP] Waiting for events");
    loop {
        let event = tokio::select! {
            event = ui_to_app_rx.recv() => event?,
            _ = cancel.cancelled() => break,
        };

        tracing::debug!(
            "[EVENT_LOOP] Event received: {:?}",
            std::mem::discriminant(&event)
        );
        handle_events(&ctx, event, &cancel).await?;
    }

    if let Some(id) = ctx.state.cancel_active() {
        tracing::info!("Cancelled session {} on shutdown", id);
    }
    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}

async fn handle_events(
    ctx: &CaptureContext,
    event: AppEvent,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    match event {
        AppEvent::Capture(mode) => {
            start_capture(ctx, mode, cancel).await?;
        }
        AppEvent::RequestRegion => request_region(ctx),
        AppEvent::WindowClosed => {
            if let Some(id) = ctx.state.cancel_active() {
                tracing::info!("Window closed, cancelled session {}", id);
            }
        }
        AppEvent::WindowMoved(pos) => {
            if let Err(e) = profile::save_window_position(&ctx.state.paths, pos) {
                tracing::warn!("Failed to save window position: {:#}", e);
            }
        }
        AppEvent::ConfigUpdate { field, value } => {
            handle_config_update(ctx, &field, &value).await;
        }
        // UI-bound events, nothing to do in the backend
        AppEvent::BackendReady
        | AppEvent::RebindHotkey(_)
        | AppEvent::OpenOverlay { .. }
        | AppEvent::CaptureReady { .. }
        | AppEvent::AnalysisDelta { .. }
        | AppEvent::AnalysisFinished { .. }
        | AppEvent::StatusUpdate { .. } => {}
    }

    Ok(())
}
