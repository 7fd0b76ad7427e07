use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::backend::{FrameStream, StreamFactory};
use crate::bitmap::CapturedBitmap;
use crate::error::CaptureError;
use crate::frame::{FrameSlot, StreamConfig};
use crate::target::CaptureTarget;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a one-shot stream per capture, takes the first frame and closes it.
///
/// Owns the only capture stream of the process: a new acquisition stops
/// whatever stream a previous (possibly abandoned) acquisition left behind.
pub struct FrameAcquirer {
    factory: Arc<dyn StreamFactory>,
    poll_interval: Duration,
    active: Mutex<Option<Box<dyn FrameStream>>>,
}

impl FrameAcquirer {
    pub fn new(factory: Arc<dyn StreamFactory>) -> Self {
        Self::with_poll_interval(factory, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(factory: Arc<dyn StreamFactory>, poll_interval: Duration) -> Self {
        Self {
            factory,
            poll_interval,
            active: Mutex::new(None),
        }
    }

    pub async fn acquire(
        &self,
        target: &CaptureTarget,
        timeout: Duration,
    ) -> Result<CapturedBitmap, CaptureError> {
        let mut active = self.active.lock().await;
        if let Some(mut previous) = active.take() {
            tracing::warn!("Stopping leftover capture stream before starting a new one");
            previous.stop();
        }

        let config = StreamConfig::for_target(target);
        let slot = FrameSlot::new();

        let mut stream = self.factory.open(target, &config)?;
        if let Err(e) = stream.start(slot.clone()) {
            stream.stop();
            return Err(e);
        }
        *active = Some(stream);
        tracing::debug!("Capture stream started for {} target", target.kind());

        let deadline = Instant::now() + timeout;
        let delivered = loop {
            if let Some(delivered) = slot.take() {
                break delivered;
            }
            if Instant::now() >= deadline {
                break Err(CaptureError::CaptureTimeout(timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        };

        if let Some(mut stream) = active.take() {
            stream.stop();
        }

        let frame = delivered?;
        tracing::debug!("Received {}x{} frame", frame.width, frame.height);
        CapturedBitmap::from_frame(frame, target.bounds().size())
    }

    /// Tear down a stream left open by a cancelled acquisition
    pub async fn stop_active(&self) {
        if let Some(mut stream) = self.active.lock().await.take() {
            stream.stop();
        }
    }
}
