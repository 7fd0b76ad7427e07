use std::io::Write;

use glimpse_types::{AnalysisOutcome, AppEvent, CaptureMode};
use tokio_util::sync::CancellationToken;

use crate::context::CaptureContext;
use crate::events::capture::start_capture;

/// Capture once and stream the answer to stdout
pub async fn run_once(
    ctx: CaptureContext,
    events: kanal::AsyncReceiver<AppEvent>,
    mode: CaptureMode,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let Some(session) = start_capture(&ctx, mode, &cancel).await? else {
        anyhow::bail!("Nothing to capture");
    };

    let mut stdout = std::io::stdout().lock();
    loop {
        tokio::select! {
            event = events.recv() => match event? {
                AppEvent::CaptureReady { saved_to: Some(path), session: s, .. } if s == session => {
                    tracing::info!("Capture saved to {}", path.display());
                }
                AppEvent::AnalysisDelta { session: s, text } if s == session => {
                    write!(stdout, "{text}")?;
                    stdout.flush()?;
                }
                AppEvent::AnalysisFinished { session: s, outcome } if s == session => {
                    writeln!(stdout)?;
                    return match outcome {
                        AnalysisOutcome::Completed => Ok(()),
                        AnalysisOutcome::Failed { message } => Err(anyhow::anyhow!(message)),
                        AnalysisOutcome::Cancelled => Err(anyhow::anyhow!("Analysis cancelled")),
                    };
                }
                _ => {}
            },
            _ = tokio::signal::ctrl_c() => {
                ctx.state.cancel_active();
                anyhow::bail!("Interrupted");
            }
        }
    }
}
