use glimpse_types::{Point, Rect};

/// Both sides must exceed this many points for a drag to count
pub const MIN_SELECTION: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    Dragging { start: Point, current: Point },
    Committed(Rect),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayOutcome {
    Selected(Rect),
    Cancelled,
}

impl OverlayOutcome {
    /// Cancellation travels to the pipeline as the zero rectangle
    pub fn into_rect(self) -> Rect {
        match self {
            OverlayOutcome::Selected(rect) => rect,
            OverlayOutcome::Cancelled => Rect::ZERO,
        }
    }
}

/// Drag-to-select state for the region overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    state: SelectionState,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SelectionState::Committed(_) | SelectionState::Cancelled
        )
    }

    pub fn press(&mut self, at: Point) {
        if self.is_finished() {
            return;
        }
        self.state = SelectionState::Dragging {
            start: at,
            current: at,
        };
    }

    /// Current normalized rectangle while dragging
    pub fn drag(&mut self, to: Point) -> Option<Rect> {
        match &mut self.state {
            SelectionState::Dragging { start, current } => {
                *current = to;
                Some(Rect::from_corners(*start, to))
            }
            _ => None,
        }
    }

    /// Commits a large enough rectangle, otherwise starts over
    pub fn release(&mut self, at: Point) -> Option<OverlayOutcome> {
        let SelectionState::Dragging { start, .. } = self.state else {
            return None;
        };

        let rect = Rect::from_corners(start, at);
        if rect.width > MIN_SELECTION && rect.height > MIN_SELECTION {
            self.state = SelectionState::Committed(rect);
            Some(OverlayOutcome::Selected(rect))
        } else {
            self.state = SelectionState::Idle;
            None
        }
    }

    pub fn cancel(&mut self) -> OverlayOutcome {
        self.state = SelectionState::Cancelled;
        OverlayOutcome::Cancelled
    }

    pub fn rect(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Dragging { start, current } => Some(Rect::from_corners(start, current)),
            SelectionState::Committed(rect) => Some(rect),
            _ => None,
        }
    }

    /// Instructions are only shown before the user starts dragging
    pub fn shows_instructions(&self) -> bool {
        self.state == SelectionState::Idle
    }
}

pub fn size_label(rect: &Rect) -> String {
    format!("{} × {}", rect.width.round() as i64, rect.height.round() as i64)
}
