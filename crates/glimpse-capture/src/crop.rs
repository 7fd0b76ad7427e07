use glimpse_types::{Rect, Size};
use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::bitmap::CapturedBitmap;

/// Cut `selection` (display-local points, top-left origin) out of a display capture.
///
/// The result is exactly `selection.width x selection.height` pixels. Degenerate
/// inputs return the bitmap untouched; a selection outside the display yields a
/// blank canvas of the requested size.
pub fn crop(bitmap: &CapturedBitmap, selection: Rect, display_bounds: Rect) -> CapturedBitmap {
    let bitmap_w = bitmap.width() as f64;
    let bitmap_h = bitmap.height() as f64;

    if selection.is_empty() || display_bounds.is_empty() || bitmap_w <= 0.0 || bitmap_h <= 0.0 {
        tracing::warn!(
            "Skipping crop: selection {:?}, display {:?}, bitmap {}x{}",
            selection,
            display_bounds,
            bitmap_w,
            bitmap_h
        );
        return bitmap.clone();
    }

    let scale_x = bitmap_w / display_bounds.width;
    let scale_y = bitmap_h / display_bounds.height;

    // Bitmap-native space has its origin at the bottom-left
    let left = (selection.x * scale_x).clamp(0.0, bitmap_w);
    let right = (selection.max_x() * scale_x).clamp(0.0, bitmap_w);
    let native_bottom = ((display_bounds.height - selection.y - selection.height) * scale_y)
        .clamp(0.0, bitmap_h);
    let native_top = ((display_bounds.height - selection.y) * scale_y).clamp(0.0, bitmap_h);

    // Back to row order for the pixel buffer
    let row_start = bitmap_h - native_top;
    let row_end = bitmap_h - native_bottom;

    let out_w = (selection.width.round() as u32).max(1);
    let out_h = (selection.height.round() as u32).max(1);
    let mut canvas = RgbaImage::new(out_w, out_h);

    let src_x = left.floor() as u32;
    let src_y = row_start.floor() as u32;
    let src_w = ((right - left).round() as u32).min(bitmap.width().saturating_sub(src_x));
    let src_h = ((row_end - row_start).round() as u32).min(bitmap.height().saturating_sub(src_y));

    if src_w > 0 && src_h > 0 {
        let region = imageops::crop_imm(bitmap.pixels(), src_x, src_y, src_w, src_h).to_image();
        let scaled = imageops::resize(&region, out_w, out_h, FilterType::Triangle);
        imageops::replace(&mut canvas, &scaled, 0, 0);
    } else {
        tracing::warn!("Selection {:?} lies outside the captured display", selection);
    }

    CapturedBitmap::new(canvas, Size::new(out_w as f64, out_h as f64))
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// 2x retina capture of a 100x50 display: top half red, bottom half blue
    fn split_capture() -> (CapturedBitmap, Rect) {
        let image = RgbaImage::from_fn(200, 100, |_, y| if y < 50 { RED } else { BLUE });
        (
            CapturedBitmap::new(image, Size::new(100.0, 50.0)),
            Rect::new(0.0, 0.0, 100.0, 50.0),
        )
    }

    #[test]
    fn test_output_matches_selection_size() {
        let (bitmap, display) = split_capture();
        for selection in [
            Rect::new(10.0, 10.0, 40.0, 20.0),
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(73.0, 3.0, 11.0, 47.0),
            Rect::new(90.0, 40.0, 30.0, 30.0),
        ] {
            let cropped = crop(&bitmap, selection, display);
            assert_eq!(
                (cropped.width(), cropped.height()),
                (selection.width as u32, selection.height as u32),
                "selection {selection:?}"
            );
        }
    }

    #[test]
    fn test_top_of_selection_maps_to_top_of_bitmap() {
        let (bitmap, display) = split_capture();

        let top = crop(&bitmap, Rect::new(10.0, 2.0, 20.0, 15.0), display);
        assert!(top.pixels().pixels().all(|p| *p == RED));

        let bottom = crop(&bitmap, Rect::new(10.0, 30.0, 20.0, 15.0), display);
        assert!(bottom.pixels().pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_invalid_selection_returns_original() {
        let (bitmap, display) = split_capture();
        let same = crop(&bitmap, Rect::new(10.0, 10.0, 0.0, 20.0), display);
        assert_eq!((same.width(), same.height()), (200, 100));

        let same = crop(&bitmap, Rect::new(10.0, 10.0, 20.0, 20.0), Rect::ZERO);
        assert_eq!((same.width(), same.height()), (200, 100));
    }

    #[test]
    fn test_selection_outside_display_is_clamped() {
        let (bitmap, display) = split_capture();
        let outside = crop(&bitmap, Rect::new(500.0, 400.0, 30.0, 20.0), display);
        assert_eq!((outside.width(), outside.height()), (30, 20));
        assert!(outside.pixels().pixels().all(|p| p.0[3] == 0));

        let negative = crop(&bitmap, Rect::new(-80.0, -60.0, 40.0, 25.0), display);
        assert_eq!((negative.width(), negative.height()), (40, 25));
    }
}
