use glimpse_types::AppEvent;

use crate::context::CaptureContext;

pub async fn handle_config_update(ctx: &CaptureContext, field: &str, value: &str) {
    let rebind = {
        let mut config = ctx.state.config.write().await;
        if let Err(e) = config.apply_update(field, value) {
            tracing::warn!("Rejected config update: {}", e);
            return;
        }
        tracing::info!("Config updated: {}", field);

        (field == "hotkeys.window_capture").then(|| config.hotkeys.window_capture.clone())
    };

    if let Some(binding) = rebind {
        ctx.notify(AppEvent::RebindHotkey(binding)).await;
    }
}
