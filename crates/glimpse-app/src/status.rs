use std::sync::Arc;

use chrono::{DateTime, Local};
use glimpse_analysis::DecodeStats;
use tokio::sync::RwLock;

/// Capture and streaming counters
#[derive(Clone, Debug, Default)]
pub struct CaptureStatus {
    pub capturing: bool,
    pub last_capture_time: Option<DateTime<Local>>,
    pub capture_count: u64,
    pub error_count: u64,
    /// SSE events that carried no usable text
    pub skipped_events: u64,
}

/// Application status
pub struct AppStatus {
    pub capture: Arc<RwLock<CaptureStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            capture: Arc::new(RwLock::new(CaptureStatus::default())),
        }
    }

    pub async fn set_capturing(&self, capturing: bool) {
        self.capture.write().await.capturing = capturing;
    }

    pub async fn record_capture(&self, at: DateTime<Local>) {
        let mut status = self.capture.write().await;
        status.capturing = false;
        status.capture_count += 1;
        status.last_capture_time = Some(at);
    }

    pub async fn record_error(&self) {
        let mut status = self.capture.write().await;
        status.capturing = false;
        status.error_count += 1;
    }

    pub async fn record_stream(&self, stats: DecodeStats) {
        if stats.skipped() > 0 {
            tracing::debug!(
                "Skipped {} SSE events ({} empty, {} malformed)",
                stats.skipped(),
                stats.empty,
                stats.malformed
            );
        }
        self.capture.write().await.skipped_events += stats.skipped();
    }

    pub async fn snapshot(&self) -> CaptureStatus {
        self.capture.read().await.clone()
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
