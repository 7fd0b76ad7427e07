use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use glimpse_analysis::{
    AnalysisError, AnalysisRequest, DeltaStream, ProviderMetadata, VisionProvider, delta_stream,
};
use glimpse_capture::{
    CaptureError, CaptureTarget, DisplayInfo, Frame, FrameAcquirer, FrameSlot, FrameStream,
    PixelFormat, ProcessId, ScreenSource, StreamConfig, StreamFactory, WindowInfo,
};
use glimpse_config::Config;
use glimpse_config::analysis::AnalysisConfig;
use glimpse_types::{AppEvent, Rect, SessionId};
use kanal::AsyncReceiver;
use tempfile::TempDir;
use tokio::time::timeout;

use crate::context::CaptureContext;
use crate::profile::ConfigPaths;
use crate::state::AppState;

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// One 200×100 window owned by pid 7 on a 400×300 primary display
pub struct FakeScreen {
    pub frontmost: Option<ProcessId>,
}

impl ScreenSource for FakeScreen {
    fn windows(&self) -> anyhow::Result<Vec<WindowInfo>> {
        Ok(vec![WindowInfo {
            id: 70,
            process_id: 7,
            app_name: "Preview".to_string(),
            title: "chart.png".to_string(),
            bounds: Rect::new(0.0, 0.0, 200.0, 100.0),
            layer: 1,
            minimized: false,
        }])
    }

    fn displays(&self) -> anyhow::Result<Vec<DisplayInfo>> {
        Ok(vec![DisplayInfo {
            id: 1,
            bounds: Rect::new(0.0, 0.0, 400.0, 300.0),
            scale_factor: 1.0,
            is_primary: true,
        }])
    }

    fn frontmost_process(&self) -> Option<ProcessId> {
        self.frontmost
    }
}

/// Delivers a solid frame the size of the target right away
pub struct SolidFactory;

struct SolidStream {
    width: u32,
    height: u32,
}

impl StreamFactory for SolidFactory {
    fn open(
        &self,
        target: &CaptureTarget,
        _config: &StreamConfig,
    ) -> Result<Box<dyn FrameStream>, CaptureError> {
        let bounds = target.bounds();
        Ok(Box::new(SolidStream {
            width: bounds.width as u32,
            height: bounds.height as u32,
        }))
    }
}

impl FrameStream for SolidStream {
    fn start(&mut self, slot: FrameSlot) -> Result<(), CaptureError> {
        slot.deliver(Frame {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8,
            data: vec![200; (self.width * self.height * 4) as usize],
        });
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Replays canned SSE chunks; `hang` keeps the body open afterwards
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    pub chunks: Vec<String>,
    pub hang: bool,
    pub requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl ScriptedProvider {
    pub fn answering(deltas: &[&str]) -> Self {
        let mut chunks: Vec<String> = deltas
            .iter()
            .map(|d| format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{d}\"}}}}]}}\n\n"))
            .collect();
        chunks.push("data: [DONE]\n\n".to_string());
        Self {
            chunks,
            ..Self::default()
        }
    }

    /// Sends the deltas, then never finishes
    pub fn stalling(deltas: &[&str]) -> Self {
        let mut provider = Self::answering(deltas);
        provider.chunks.pop();
        provider.hang = true;
        provider
    }
}

#[async_trait::async_trait]
impl VisionProvider for ScriptedProvider {
    async fn analyze(&self, request: AnalysisRequest) -> Result<DeltaStream, AnalysisError> {
        if request.api_key.is_empty() {
            return Err(AnalysisError::MissingCredential);
        }
        self.requests.lock().unwrap().push(request);

        let body = stream::iter(self.chunks.clone())
            .map(|chunk| Ok::<_, AnalysisError>(chunk.into_bytes()));
        if self.hang {
            Ok(delta_stream(body.chain(stream::pending())))
        } else {
            Ok(delta_stream(body))
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "scripted".to_string(),
            model: "none".to_string(),
            requires_api_key: true,
        }
    }
}

pub struct Harness {
    pub ctx: CaptureContext,
    pub events: AsyncReceiver<AppEvent>,
    pub dir: TempDir,
}

pub fn harness(provider: ScriptedProvider, screen: FakeScreen, api_key: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.analysis.api_key = api_key.to_string();
    config.capture.output_dir = Some(dir.path().join("captures").to_string_lossy().into_owned());

    let state = Arc::new(AppState::new(config, ConfigPaths::new(dir.path()), "main"));
    let (event_tx, events) = kanal::bounded_async(256);
    let provider: Arc<dyn VisionProvider> = Arc::new(provider);

    let ctx = CaptureContext {
        state,
        screens: Arc::new(screen),
        acquirer: Arc::new(FrameAcquirer::with_poll_interval(
            Arc::new(SolidFactory),
            Duration::from_millis(5),
        )),
        providers: Arc::new(move |_: &AnalysisConfig| provider.clone()),
        event_tx,
    };

    Harness { ctx, events, dir }
}

pub async fn next_event(events: &AsyncReceiver<AppEvent>) -> AppEvent {
    timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("Timed out waiting for an event")
        .expect("Event channel closed")
}

/// Everything up to and including `AnalysisFinished` for `session`
pub async fn events_until_finished(
    events: &AsyncReceiver<AppEvent>,
    session: SessionId,
) -> Vec<AppEvent> {
    let mut seen = Vec::new();
    loop {
        let event = next_event(events).await;
        let done = matches!(&event, AppEvent::AnalysisFinished { session: s, .. } if *s == session);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

pub fn deltas_for(events: &[AppEvent], session: SessionId) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AnalysisDelta { session: s, text } if *s == session => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
