use std::sync::Arc;

use glimpse_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::CaptureContext;
use crate::events::event_loop;
use crate::io::watcher_io;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // delta bursts
            ui_to_app: kanal::bounded_async(64),  // UI interactions
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new() -> Self {
        Self {
            channels: ChannelSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn event_sender(&self) -> AsyncSender<AppEvent> {
        self.channels.app_to_ui.0.clone()
    }

    /// Receiving end for the UI thread
    pub fn ui_receiver(&self) -> AsyncReceiver<AppEvent> {
        self.channels.app_to_ui.1.clone()
    }

    pub fn ui_sender(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn spawn_tasks(&self, ctx: CaptureContext, handle: &Handle) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn_on(
            event_loop(
                ctx.clone(),
                self.channels.ui_to_app.1.clone(),
                self.cancel_token.child_token(),
            ),
            handle,
        );

        // Profile watcher
        tasks.spawn_on(
            watcher_io(
                Arc::clone(&ctx.state),
                self.cancel_token.child_token(),
                self.channels.app_to_ui.0.clone(),
            ),
            handle,
        );

        // Closing the UI channel is what ends the Slint event loop
        let cancel = self.cancel_token.clone();
        let app_to_ui = self.channels.app_to_ui.0.clone();
        tasks.spawn_on(
            async move {
                cancel.cancelled().await;
                let _ = app_to_ui.close();
                Ok(())
            },
            handle,
        );

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Default for AppController {
    fn default() -> Self {
        Self::new()
    }
}
