use std::sync::{Arc, Mutex, PoisonError};

use glimpse_types::Rect;

use crate::error::CaptureError;
use crate::target::CaptureTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32-bit BGRA, what the compositor hands out natively
    Bgra8,
    Rgba8,
}

/// One decoded sample from a capture stream
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl Frame {
    /// Pixel data as RGBA8, swizzling BGRA in place
    pub fn into_rgba(self) -> Vec<u8> {
        let mut data = self.data;
        if self.format == PixelFormat::Bgra8 {
            for px in data.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }
        data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Captured area in global screen points
    pub source_rect: Rect,
    pub pixel_format: PixelFormat,
    pub shows_cursor: bool,
}

impl StreamConfig {
    pub fn for_target(target: &CaptureTarget) -> Self {
        Self {
            source_rect: target.bounds(),
            pixel_format: PixelFormat::Bgra8,
            shows_cursor: false,
        }
    }
}

/// Hand-off between the delivery thread (writer) and the acquirer (reader).
///
/// Only the first delivery is kept; a stream that keeps producing after the
/// slot is full overwrites nothing.
#[derive(Clone, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<Option<Result<Frame, CaptureError>>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a frame. Returns false when the slot was already filled
    pub fn deliver(&self, frame: Frame) -> bool {
        self.put(Ok(frame))
    }

    pub fn fail(&self, error: CaptureError) -> bool {
        self.put(Err(error))
    }

    pub fn take(&self) -> Option<Result<Frame, CaptureError>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn put(&self, value: Result<Frame, CaptureError>) -> bool {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return false;
        }
        *guard = Some(value);
        true
    }
}
