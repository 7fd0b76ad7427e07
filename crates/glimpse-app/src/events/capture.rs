use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use glimpse_analysis::{AnalysisSession, analyze};
use glimpse_capture::{
    CaptureTarget, PersistenceSink, ResolutionError, ScreenSource, crop, resolve,
};
use glimpse_types::{AnalysisOutcome, AppEvent, CaptureMode, ProcessId, SessionId};
use tokio_util::sync::CancellationToken;

use crate::context::CaptureContext;
use crate::state::ActiveSession;

/// Longest edge of the preview sent to the window
const THUMBNAIL_EDGE: u32 = 480;

/// Resolve the target and hand it to a fresh session.
///
/// Returns `None` when there is nothing to capture (cancelled selection,
/// no frontmost window, ...); the running session is then left alone.
pub async fn start_capture(
    ctx: &CaptureContext,
    mode: CaptureMode,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<SessionId>> {
    let screens = ctx.screens.clone();
    let resolved = tokio::task::spawn_blocking(move || {
        let target = resolve(screens.as_ref(), mode)?;
        let previous_focus = match &target {
            CaptureTarget::ActiveWindow { process_id, .. } => Some(*process_id),
            CaptureTarget::Display { .. } => screens.frontmost_process(),
            // Looked up before the overlay opened
            CaptureTarget::Region { .. } => None,
        };
        Ok::<_, ResolutionError>((target, previous_focus))
    })
    .await;

    let (target, previous_focus) = match resolved {
        Ok(Ok(resolved)) => resolved,
        Ok(Err(ResolutionError::SelectionCancelled)) => {
            tracing::debug!("Region selection cancelled");
            return Ok(None);
        }
        Ok(Err(e)) => {
            tracing::warn!("No capture target: {}", e);
            ctx.state.status.record_error().await;
            return Ok(None);
        }
        Err(e) => {
            tracing::error!("Resolver task failed: {}", e);
            return Ok(None);
        }
    };

    let session = ctx.state.begin_session(cancel);
    let id = session.id;
    tracing::info!("Starting {} capture for session {}", target.kind(), id);

    tokio::spawn(run_pipeline(ctx.clone(), target, session, previous_focus));
    Ok(Some(id))
}

/// Look up the focused app off the event loop, then let the UI open the
/// selection overlay
pub fn request_region(ctx: &CaptureContext) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        let screens = ctx.screens.clone();
        let previous_focus = tokio::task::spawn_blocking(move || screens.frontmost_process())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Focus lookup task failed: {}", e);
                None
            });
        ctx.notify(AppEvent::OpenOverlay { previous_focus }).await;
    });
}

/// Capture → crop → persist → analyze, ending with `AnalysisFinished`
pub async fn run_pipeline(
    ctx: CaptureContext,
    target: CaptureTarget,
    session: ActiveSession,
    previous_focus: Option<ProcessId>,
) {
    let id = session.id;

    let outcome = tokio::select! {
        outcome = capture_and_analyze(&ctx, &target, id, previous_focus) => outcome,
        _ = session.cancel.cancelled() => {
            tracing::info!("Session {} cancelled", id);
            ctx.acquirer.stop_active().await;
            AnalysisOutcome::Cancelled
        }
    };

    ctx.state.end_session(id);
    ctx.state.status.set_capturing(false).await;
    ctx.notify(AppEvent::AnalysisFinished {
        session: id,
        outcome,
    })
    .await;
}

async fn capture_and_analyze(
    ctx: &CaptureContext,
    target: &CaptureTarget,
    session: SessionId,
    previous_focus: Option<ProcessId>,
) -> AnalysisOutcome {
    let (timeout, save_captures, output_dir, analysis) = {
        let config = ctx.state.config.read().await;
        (
            Duration::from_millis(config.capture.timeout_ms),
            config.capture.save_captures,
            config.capture.output_dir.clone(),
            config.analysis.clone(),
        )
    };

    ctx.state.status.set_capturing(true).await;
    ctx.notify(AppEvent::StatusUpdate {
        status: "Capturing…".to_string(),
        capturing: true,
    })
    .await;

    let bitmap = match ctx.acquirer.acquire(target, timeout).await {
        Ok(bitmap) => bitmap,
        Err(e) => {
            tracing::error!("Capture failed: {}", e);
            ctx.state.status.record_error().await;
            return AnalysisOutcome::Failed {
                message: format!("Capture failed: {e}"),
            };
        }
    };

    let bitmap = match target {
        CaptureTarget::Region {
            selection,
            display_bounds,
            ..
        } => crop(&bitmap, *selection, *display_bounds),
        _ => bitmap,
    };

    let taken_at = Local::now();
    ctx.state.status.record_capture(taken_at).await;

    // PNG encoding and disk writes stay off the async workers
    let encoded = tokio::task::spawn_blocking(move || {
        let saved_to = save_captures
            .then(|| {
                PersistenceSink::new(output_dir.map(PathBuf::from))
                    .write(&bitmap, taken_at)
                    .inspect_err(|e| tracing::warn!("Capture not saved: {}", e))
                    .ok()
            })
            .flatten();
        let png = bitmap.encode_png();
        (saved_to, png, bitmap.thumbnail(THUMBNAIL_EDGE))
    })
    .await;

    let (saved_to, png, thumbnail) = match encoded {
        Ok((saved_to, Ok(png), thumbnail)) => (saved_to, png, thumbnail),
        Ok((_, Err(e), _)) => {
            tracing::error!("PNG encoding failed: {:#}", e);
            ctx.state.status.record_error().await;
            return AnalysisOutcome::Failed {
                message: "Could not encode the capture".to_string(),
            };
        }
        Err(e) => {
            tracing::error!("Encoder task failed: {}", e);
            return AnalysisOutcome::Failed {
                message: "Could not encode the capture".to_string(),
            };
        }
    };

    ctx.notify(AppEvent::CaptureReady {
        session,
        thumbnail,
        saved_to,
        previous_focus,
    })
    .await;
    ctx.notify(AppEvent::StatusUpdate {
        status: "Analyzing…".to_string(),
        capturing: false,
    })
    .await;

    let provider = (ctx.providers)(&analysis);
    let metadata = provider.metadata();
    tracing::info!(
        "Analyzing session {} with {} ({})",
        session,
        metadata.name,
        metadata.model
    );
    let mut analysis_session = AnalysisSession::new(session, analysis.prompt.clone());
    let tx = ctx.event_tx.clone();

    let result = analyze(
        provider.as_ref(),
        &mut analysis_session,
        png,
        &analysis.api_key,
        |text| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(AppEvent::AnalysisDelta { session, text }).await;
            }
        },
    )
    .await;

    match result {
        Ok(stats) => {
            ctx.state.status.record_stream(stats).await;
            tracing::info!(
                "Session {} complete ({} chars)",
                session,
                analysis_session.text().chars().count()
            );
            AnalysisOutcome::Completed
        }
        Err(e) => {
            tracing::warn!("Analysis for session {} failed: {}", session, e);
            AnalysisOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}
