use std::sync::Arc;

use anyhow::{Context, Result};
use glimpse_types::{Size, Thumbnail};
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::CaptureError;
use crate::frame::Frame;

/// Finalized screenshot. Cheap to clone, never mutated after creation
#[derive(Clone)]
pub struct CapturedBitmap {
    pixels: Arc<RgbaImage>,
    logical_size: Size,
    scale: f64,
}

impl CapturedBitmap {
    /// Wrap pixels covering `logical_size` points
    pub fn new(pixels: RgbaImage, logical_size: Size) -> Self {
        let scale = if logical_size.width > 0.0 {
            pixels.width() as f64 / logical_size.width
        } else {
            1.0
        };

        Self {
            pixels: Arc::new(pixels),
            logical_size,
            scale,
        }
    }

    pub fn from_frame(frame: Frame, logical_size: Size) -> Result<Self, CaptureError> {
        let (width, height) = (frame.width, frame.height);
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidFrame(format!(
                "empty frame {width}x{height}"
            )));
        }

        let data = frame.into_rgba();
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CaptureError::InvalidFrame(format!(
                "{} bytes for {width}x{height}, expected {expected}",
                data.len()
            )));
        }

        let pixels = RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| CaptureError::InvalidFrame("buffer size mismatch".to_string()))?;
        Ok(Self::new(pixels, logical_size))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn logical_size(&self) -> Size {
        self.logical_size
    }

    /// Pixels per point
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(
                self.pixels.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .context("Failed to encode PNG")?;
        Ok(buffer)
    }

    /// Downscaled copy whose longest edge is at most `max_edge` pixels
    pub fn thumbnail(&self, max_edge: u32) -> Thumbnail {
        let longest = self.width().max(self.height());
        let image = if longest > max_edge && max_edge > 0 {
            let ratio = max_edge as f64 / longest as f64;
            let width = ((self.width() as f64 * ratio).round() as u32).max(1);
            let height = ((self.height() as f64 * ratio).round() as u32).max(1);
            image::imageops::resize(self.pixels.as_ref(), width, height, FilterType::Triangle)
        } else {
            self.pixels.as_ref().clone()
        };

        Thumbnail {
            width: image.width(),
            height: image.height(),
            rgba: Arc::from(image.into_raw()),
        }
    }
}
