use std::sync::Arc;

use glimpse_analysis::{OpenAiCompatibleProvider, VisionProvider};
use glimpse_capture::{FrameAcquirer, ScreenSource};
use glimpse_config::analysis::AnalysisConfig;
use glimpse_types::AppEvent;
use kanal::AsyncSender;

use crate::state::AppState;

/// Builds the provider for the current analysis settings
pub type ProviderFactory = Arc<dyn Fn(&AnalysisConfig) -> Arc<dyn VisionProvider> + Send + Sync>;

pub fn openai_provider() -> ProviderFactory {
    Arc::new(|config: &AnalysisConfig| {
        Arc::new(OpenAiCompatibleProvider::new(
            config.api_url.clone(),
            config.model.clone(),
            config.max_tokens,
        )) as Arc<dyn VisionProvider>
    })
}

/// Shared dependencies of the capture pipeline
#[derive(Clone)]
pub struct CaptureContext {
    pub state: Arc<AppState>,
    pub screens: Arc<dyn ScreenSource>,
    pub acquirer: Arc<FrameAcquirer>,
    pub providers: ProviderFactory,
    pub event_tx: AsyncSender<AppEvent>,
}

impl CaptureContext {
    /// Send to the UI; a closed channel only means we are shutting down
    pub async fn notify(&self, event: AppEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            tracing::debug!("UI channel closed, dropping event: {}", e);
        }
    }
}
