use std::sync::Arc;
use std::time::{Duration, SystemTime};

use glimpse_config::Config;
use glimpse_types::AppEvent;
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

use crate::profile;
use crate::state::AppState;

const MIN_WATCH_INTERVAL: Duration = Duration::from_millis(50);

async fn modified_at(path: &std::path::Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Reload the active profile whenever its file changes on disk
pub async fn watcher_io(
    state: Arc<AppState>,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let every = {
        let config = state.config.read().await;
        Duration::from_millis(config.watch_interval_ms).max(MIN_WATCH_INTERVAL)
    };
    let file = state.paths.profile_file(&state.profile);
    let mut last_seen = modified_at(&file).await;
    let mut interval = tokio::time::interval(every);

    tracing::info!("Watching {} for changes", file.display());
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = cancel.cancelled() => {
                tracing::info!("Profile watcher stopping");
                break;
            }
        }

        let current = modified_at(&file).await;
        if current == last_seen {
            continue;
        }
        last_seen = current;

        match profile::load_user_profile(&state.paths, &state.profile) {
            Ok(config) => apply_reload(&state, config.with_env_overrides(), &event_tx).await,
            Err(e) => tracing::warn!("Ignoring unreadable profile edit: {:#}", e),
        }
    }

    Ok(())
}

async fn apply_reload(state: &AppState, reloaded: Config, event_tx: &AsyncSender<AppEvent>) {
    let rebind = {
        let mut config = state.config.write().await;
        let changed = config.hotkeys.window_capture != reloaded.hotkeys.window_capture;
        *config = reloaded;
        changed.then(|| config.hotkeys.window_capture.clone())
    };
    tracing::info!("Profile '{}' reloaded", state.profile);

    if let Some(binding) = rebind
        && let Err(e) = event_tx.send(AppEvent::RebindHotkey(binding)).await
    {
        tracing::debug!("UI channel closed, skipping hotkey rebind: {}", e);
    }
}
