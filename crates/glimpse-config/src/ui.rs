use serde::{Deserialize, Serialize};

fn default_window_width() -> f64 {
    420.0
}

fn default_window_height() -> f64 {
    520.0
}

fn default_bottom_margin() -> f64 {
    80.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    #[serde(default = "default_window_width")]
    pub window_width: f64,
    #[serde(default = "default_window_height")]
    pub window_height: f64,
    /// Gap between the default window placement and the screen bottom
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            bottom_margin: default_bottom_margin(),
        }
    }
}
