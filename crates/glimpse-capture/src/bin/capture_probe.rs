//! Capture smoke test - run with: cargo run -p glimpse-capture --bin capture_probe

use std::sync::Arc;

use anyhow::Result;
use glimpse_capture::{FrameAcquirer, PersistenceSink, ScreenSource, XcapBackend, resolve};
use glimpse_types::CaptureMode;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber_init();

    let backend = Arc::new(XcapBackend::new());

    tracing::info!("1. Visible windows:");
    for (id, title) in glimpse_capture::list_windows()?.iter().take(10) {
        tracing::info!("   [{}] {}", id, title);
    }

    tracing::info!("2. Frontmost process: {:?}", backend.frontmost_process());

    let acquirer = FrameAcquirer::new(backend.clone());
    let sink = PersistenceSink::new(Some(std::env::current_dir()?));

    for mode in [CaptureMode::Display, CaptureMode::ActiveWindow] {
        let start = std::time::Instant::now();
        let target = match resolve(backend.as_ref(), mode) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("   {:?}: {}", mode, e);
                continue;
            }
        };

        match acquirer
            .acquire(&target, glimpse_capture::DEFAULT_TIMEOUT)
            .await
        {
            Ok(bitmap) => {
                let path = sink.write(&bitmap, chrono::Local::now())?;
                tracing::info!(
                    "   {:?}: {}x{} @{}x in {:?} -> {}",
                    mode,
                    bitmap.width(),
                    bitmap.height(),
                    bitmap.scale(),
                    start.elapsed(),
                    path.display()
                );
            }
            Err(e) => tracing::warn!("   {:?}: {}", mode, e),
        }
    }

    Ok(())
}

fn tracing_subscriber_init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
