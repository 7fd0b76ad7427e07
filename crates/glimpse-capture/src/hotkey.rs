use global_hotkey::hotkey::{Code, HotKey};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};

use crate::error::HotkeyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Capture the active window, or close the result window if it is showing
    CaptureWindow,
    CaptureRegion,
    /// Escape pressed while the selection overlay is up
    Escape,
}

/// Parse a binding such as `alt+shift+KeyS`
pub fn parse_binding(binding: &str) -> Result<HotKey, HotkeyError> {
    binding
        .trim()
        .parse::<HotKey>()
        .map_err(|e| HotkeyError::InvalidBinding {
            binding: binding.to_string(),
            reason: e.to_string(),
        })
}

/// Owns the process-wide hotkey registrations.
///
/// Must be created on the thread that runs the platform event loop.
pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    window_capture: HotKey,
    region_capture: HotKey,
    escape: Option<HotKey>,
}

impl HotkeyManager {
    pub fn new(window_binding: &str, region_binding: &str) -> Result<Self, HotkeyError> {
        let window_capture = parse_binding(window_binding)?;
        let region_capture = parse_binding(region_binding)?;

        let manager = GlobalHotKeyManager::new()?;
        manager.register(window_capture)?;
        if let Err(e) = manager.register(region_capture) {
            let _ = manager.unregister(window_capture);
            return Err(e.into());
        }

        tracing::info!(
            "Hotkeys registered: window capture ({}), region capture ({})",
            window_binding,
            region_binding
        );

        Ok(Self {
            manager,
            window_capture,
            region_capture,
            escape: None,
        })
    }

    /// Swap the window-capture binding, unregistering the old one first.
    /// The previous binding is restored if the new one cannot be registered
    pub fn rebind_window_capture(&mut self, binding: &str) -> Result<(), HotkeyError> {
        let hotkey = parse_binding(binding)?;
        if hotkey.id() == self.window_capture.id() {
            return Ok(());
        }

        self.manager.unregister(self.window_capture)?;
        if let Err(e) = self.manager.register(hotkey) {
            tracing::error!("Failed to register '{}', restoring previous hotkey", binding);
            self.manager.register(self.window_capture)?;
            return Err(e.into());
        }

        self.window_capture = hotkey;
        tracing::info!("Window capture hotkey rebound to {}", binding);
        Ok(())
    }

    /// Register a global Escape so the overlay can be cancelled without focus
    pub fn watch_escape(&mut self) -> Result<(), HotkeyError> {
        if self.escape.is_some() {
            return Ok(());
        }
        let escape = HotKey::new(None, Code::Escape);
        self.manager.register(escape)?;
        self.escape = Some(escape);
        Ok(())
    }

    pub fn release_escape(&mut self) {
        if let Some(escape) = self.escape.take()
            && let Err(e) = self.manager.unregister(escape)
        {
            tracing::warn!("Failed to unregister Escape monitor: {}", e);
        }
    }

    /// Next pressed hotkey, if any (non-blocking)
    pub fn poll(&self) -> Option<HotkeyAction> {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.try_recv() {
            if event.state != HotKeyState::Pressed {
                continue;
            }
            match self.action_for(event.id) {
                Some(action) => return Some(action),
                None => tracing::debug!("Ignoring unknown hotkey id {}", event.id),
            }
        }
        None
    }

    fn action_for(&self, id: u32) -> Option<HotkeyAction> {
        if id == self.window_capture.id() {
            Some(HotkeyAction::CaptureWindow)
        } else if id == self.region_capture.id() {
            Some(HotkeyAction::CaptureRegion)
        } else if self.escape.is_some_and(|e| e.id() == id) {
            Some(HotkeyAction::Escape)
        } else {
            None
        }
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        self.release_escape();
        let _ = self.manager.unregister(self.window_capture);
        let _ = self.manager.unregister(self.region_capture);
    }
}
