use serde::{Deserialize, Serialize};

/// Region capture is not user-configurable
pub const REGION_CAPTURE_HOTKEY: &str = "alt+shift+KeyR";

fn default_window_capture() -> String {
    "alt+shift+KeyS".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Capture + analyze the active window, or close the result window
    #[serde(default = "default_window_capture")]
    pub window_capture: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            window_capture: default_window_capture(),
        }
    }
}
