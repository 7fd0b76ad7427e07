use serde::{Deserialize, Serialize};

/// Point in screen points, origin top-left, Y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Sentinel emitted by the selection overlay when the user cancels
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners, whatever the drag direction
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self {
            x: min_x,
            y: min_y,
            width: a.x.max(b.x) - min_x,
            height: a.y.max(b.y) - min_y,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn is_zero(&self) -> bool {
        *self == Rect::ZERO
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }
}

/// Persisted top-left offset of the floating window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: f64,
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes_any_direction() {
        let expected = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(
            Rect::from_corners(Point::new(10.0, 20.0), Point::new(40.0, 60.0)),
            expected
        );
        assert_eq!(
            Rect::from_corners(Point::new(40.0, 60.0), Point::new(10.0, 20.0)),
            expected
        );
        assert_eq!(
            Rect::from_corners(Point::new(40.0, 20.0), Point::new(10.0, 60.0)),
            expected
        );
    }

    #[test]
    fn test_zero_rect_is_empty() {
        assert!(Rect::ZERO.is_empty());
        assert!(Rect::ZERO.is_zero());
        assert!(Rect::new(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 5.0, 5.0).is_empty());
    }

    #[test]
    fn test_contains_rect() {
        let screen = Rect::new(0.0, 0.0, 1440.0, 900.0);
        assert!(screen.contains_rect(&Rect::new(100.0, 100.0, 400.0, 300.0)));
        assert!(!screen.contains_rect(&Rect::new(1300.0, 100.0, 400.0, 300.0)));
        assert!(!screen.contains_rect(&Rect::new(-1.0, 0.0, 10.0, 10.0)));
    }
}
