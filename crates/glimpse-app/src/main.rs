use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use glimpse_capture::{FrameAcquirer, SystemFocus, XcapBackend};
use glimpse_types::CaptureMode;
use glimpse_ui::UiContext;
use tracing_subscriber::EnvFilter;

mod context;
mod controller;
mod events;
mod headless;
mod io;
mod profile;
mod state;
mod status;

#[cfg(test)]
mod tests;

use self::context::{CaptureContext, openai_provider};
use self::controller::AppController;
use self::profile::ConfigPaths;
use self::state::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "glimpse",
    version,
    about = "Hotkey screenshots answered by a vision model"
)]
struct Cli {
    /// Profile to load from the config directory
    #[arg(long, default_value = "main")]
    profile: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Capture once, print the answer and exit without UI
    #[arg(long, value_enum)]
    once: Option<OnceMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnceMode {
    Window,
    Display,
}

impl From<OnceMode> for CaptureMode {
    fn from(mode: OnceMode) -> Self {
        match mode {
            OnceMode::Window => CaptureMode::ActiveWindow,
            OnceMode::Display => CaptureMode::Display,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,glimpse=info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let paths = ConfigPaths::system()?;
    profile::init_user_config(&paths)?;
    let config = profile::load_user_profile(&paths, &cli.profile)?.with_env_overrides();
    if config.analysis.api_key.is_empty() {
        tracing::warn!("No API key configured, set GLIMPSE_API_KEY or analysis.api_key");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("glimpse-worker")
        .build()
        .context("Failed to start async runtime")?;

    let backend = Arc::new(XcapBackend::new());
    let acquirer = Arc::new(FrameAcquirer::with_poll_interval(
        backend.clone(),
        Duration::from_millis(config.capture.poll_interval_ms),
    ));
    let window_binding = config.hotkeys.window_capture.clone();
    let ui_config = config.ui.clone();
    let state = Arc::new(AppState::new(config, paths.clone(), cli.profile));

    let controller = AppController::new();
    let ctx = CaptureContext {
        state,
        screens: backend.clone(),
        acquirer,
        providers: openai_provider(),
        event_tx: controller.event_sender(),
    };

    if let Some(mode) = cli.once {
        return runtime.block_on(headless::run_once(ctx, controller.ui_receiver(), mode.into()));
    }

    let mut tasks = controller.spawn_tasks(ctx, runtime.handle());

    let cancel = controller.cancel_token();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    // Slint owns the main thread until the backend channel closes
    let ui_result = glimpse_ui::ui_loop(
        UiContext {
            screens: backend,
            focus: Arc::new(SystemFocus::new()),
            window_binding,
            config: ui_config,
            saved_position: profile::load_window_position(&paths),
        },
        controller.ui_receiver(),
        controller.ui_sender(),
    );

    controller.shutdown();
    runtime.block_on(async {
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Task exited with error: {:#}", e),
                Err(e) => tracing::error!("Task panicked: {}", e),
            }
        }
    });
    runtime.shutdown_timeout(Duration::from_secs(1));

    ui_result
}
