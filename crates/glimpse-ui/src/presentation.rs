use glimpse_types::{AnalysisOutcome, ProcessId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyDecision {
    Capture,
    /// Window is up: close it instead of capturing
    Dismiss,
}

/// What the window has to do when a new capture arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowPlan {
    pub create: bool,
    pub place: bool,
}

/// State behind the floating result window, independent of the toolkit
#[derive(Debug, Default)]
pub struct PresentationState {
    created: bool,
    visible: bool,
    active_session: Option<SessionId>,
    previous_focus: Option<ProcessId>,
    text: String,
    status: String,
    alert: Option<String>,
}

impl PresentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn window_hotkey(&self) -> HotkeyDecision {
        if self.visible {
            HotkeyDecision::Dismiss
        } else {
            HotkeyDecision::Capture
        }
    }

    /// Remember who had focus before we show up. Ignored while visible,
    /// since the frontmost app is then ourselves or the user's later choice
    pub fn remember_focus(&mut self, pid: Option<ProcessId>) {
        if !self.visible {
            self.previous_focus = pid;
        }
    }

    /// Hide and forget the session; returns the app to re-activate
    pub fn dismiss(&mut self) -> Option<ProcessId> {
        self.visible = false;
        self.active_session = None;
        self.previous_focus.take()
    }

    /// `previous_focus` is `None` for region captures, whose focus was
    /// remembered when the overlay opened
    pub fn capture_ready(
        &mut self,
        session: SessionId,
        previous_focus: Option<ProcessId>,
    ) -> ShowPlan {
        let plan = ShowPlan {
            create: !self.created,
            place: !self.visible,
        };
        if previous_focus.is_some() {
            self.remember_focus(previous_focus);
        }

        self.created = true;
        self.visible = true;
        self.active_session = Some(session);
        self.text.clear();
        self.alert = None;
        self.status = "Analyzing…".to_string();

        plan
    }

    /// Append a delta; false when it belongs to a superseded session
    pub fn apply_delta(&mut self, session: SessionId, delta: &str) -> bool {
        if self.active_session != Some(session) {
            tracing::trace!("Dropping delta for inactive session {}", session);
            return false;
        }
        self.text.push_str(delta);
        true
    }

    pub fn finish(&mut self, session: SessionId, outcome: &AnalysisOutcome) -> bool {
        if self.active_session != Some(session) {
            return false;
        }

        match outcome {
            AnalysisOutcome::Completed => {
                self.status = "Done".to_string();
            }
            AnalysisOutcome::Failed { message } => {
                self.status = "Failed".to_string();
                self.alert = Some(message.clone());
            }
            AnalysisOutcome::Cancelled => {
                self.status = "Cancelled".to_string();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_created_once_and_retargeted() {
        let mut state = PresentationState::new();
        let first = SessionId::new();
        assert_eq!(
            state.capture_ready(first, None),
            ShowPlan {
                create: true,
                place: true
            }
        );
        state.apply_delta(first, "old text");

        let second = SessionId::new();
        assert_eq!(
            state.capture_ready(second, None),
            ShowPlan {
                create: false,
                place: false
            }
        );
        assert_eq!(state.text(), "");
        assert_eq!(state.active_session(), Some(second));

        state.dismiss();
        assert_eq!(
            state.capture_ready(SessionId::new(), None),
            ShowPlan {
                create: false,
                place: true
            }
        );
    }

    #[test]
    fn test_hotkey_toggles_while_visible() {
        let mut state = PresentationState::new();
        assert_eq!(state.window_hotkey(), HotkeyDecision::Capture);

        state.capture_ready(SessionId::new(), Some(42));
        assert_eq!(state.window_hotkey(), HotkeyDecision::Dismiss);

        // Our own window is frontmost now; keep the original app
        state.remember_focus(Some(7));
        state.capture_ready(SessionId::new(), Some(7));
        assert_eq!(state.dismiss(), Some(42));
        assert_eq!(state.window_hotkey(), HotkeyDecision::Capture);
        assert_eq!(state.dismiss(), None);
    }

    #[test]
    fn test_region_capture_keeps_focus_from_overlay() {
        let mut state = PresentationState::new();
        state.remember_focus(Some(42));
        state.capture_ready(SessionId::new(), None);
        assert_eq!(state.dismiss(), Some(42));
    }

    #[test]
    fn test_stale_deltas_are_dropped() {
        let mut state = PresentationState::new();
        let old = SessionId::new();
        let new = SessionId::new();

        state.capture_ready(old, None);
        assert!(state.apply_delta(old, "A "));
        state.capture_ready(new, None);

        assert!(!state.apply_delta(old, "stale"));
        assert!(state.apply_delta(new, "fresh "));
        assert!(state.apply_delta(new, "text"));
        assert!(!state.finish(old, &AnalysisOutcome::Completed));

        assert_eq!(state.text(), "fresh text");
    }

    #[test]
    fn test_failure_keeps_partial_text_and_alerts() {
        let mut state = PresentationState::new();
        let session = SessionId::new();
        state.capture_ready(session, None);
        state.apply_delta(session, "Partial");

        assert!(state.finish(
            session,
            &AnalysisOutcome::Failed {
                message: "No API key configured".to_string()
            }
        ));
        assert_eq!(state.text(), "Partial");
        assert_eq!(state.alert(), Some("No API key configured"));
        assert_eq!(state.status(), "Failed");
    }

    #[test]
    fn test_deltas_after_dismiss_are_dropped() {
        let mut state = PresentationState::new();
        let session = SessionId::new();
        state.capture_ready(session, None);
        state.dismiss();
        assert!(!state.apply_delta(session, "late"));
    }
}
