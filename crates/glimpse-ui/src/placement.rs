use glimpse_capture::DisplayInfo;
use glimpse_types::{Rect, Size, WindowPosition};

/// Saved position if the whole window still fits on a connected display,
/// otherwise the bottom centre of the primary display
pub fn resolve_position(
    saved: Option<WindowPosition>,
    window: Size,
    displays: &[DisplayInfo],
    bottom_margin: f64,
) -> WindowPosition {
    if let Some(pos) = saved
        && is_on_screen(pos, window, displays)
    {
        return pos;
    }

    if saved.is_some() {
        tracing::debug!("Saved window position is off-screen, using default");
    }
    default_position(window, displays, bottom_margin)
}

pub fn is_on_screen(pos: WindowPosition, window: Size, displays: &[DisplayInfo]) -> bool {
    let frame = Rect::new(pos.x, pos.y, window.width, window.height);
    displays.iter().any(|d| d.bounds.contains_rect(&frame))
}

pub fn default_position(window: Size, displays: &[DisplayInfo], bottom_margin: f64) -> WindowPosition {
    let Some(display) = displays
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| displays.first())
    else {
        return WindowPosition { x: 0.0, y: 0.0 };
    };

    let b = display.bounds;
    WindowPosition {
        x: b.x + (b.width - window.width) / 2.0,
        y: (b.max_y() - window.height - bottom_margin).max(b.y),
    }
}
