use std::env;

use serde::{Deserialize, Serialize};

use self::analysis::AnalysisConfig;
use self::capture::CaptureConfig;
use self::hotkeys::HotkeyConfig;
use self::ui::UiConfig;

pub mod analysis;
pub mod capture;
pub mod hotkeys;
pub mod ui;

fn default_watch_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub capture: CaptureConfig,
    pub hotkeys: HotkeyConfig,
    pub ui: UiConfig,

    /// How often the profile file is checked for edits
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown config field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            capture: CaptureConfig::default(),
            hotkeys: HotkeyConfig::default(),
            ui: UiConfig::default(),
            watch_interval_ms: default_watch_interval_ms(),
        }
    }
}

impl Config {
    /// Overlay GLIMPSE_* environment variables on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = env::var("GLIMPSE_API_KEY")
            && !key.trim().is_empty()
        {
            self.analysis.api_key = key.trim().to_string();
        }

        if let Ok(url) = env::var("GLIMPSE_API_URL") {
            self.analysis.api_url = url;
        }

        if let Ok(model) = env::var("GLIMPSE_MODEL") {
            self.analysis.model = model;
        }

        if let Some(timeout) = env::var("GLIMPSE_CAPTURE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.capture.timeout_ms = timeout;
        }

        if let Ok(dir) = env::var("GLIMPSE_OUTPUT_DIR") {
            self.capture.output_dir = Some(dir);
        }

        self
    }

    /// Apply a single runtime update addressed by dotted field name
    pub fn apply_update(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };

        match field {
            "hotkeys.window_capture" => {
                if value.trim().is_empty() {
                    return Err(invalid());
                }
                self.hotkeys.window_capture = value.trim().to_string();
            }
            "analysis.prompt" => self.analysis.prompt = value.to_string(),
            "analysis.model" => {
                if value.trim().is_empty() {
                    return Err(invalid());
                }
                self.analysis.model = value.trim().to_string();
            }
            "analysis.max_tokens" => {
                self.analysis.max_tokens = value.parse().map_err(|_| invalid())?;
            }
            "capture.timeout_ms" => {
                self.capture.timeout_ms = value.parse().map_err(|_| invalid())?;
            }
            _ => return Err(ConfigError::UnknownField(field.to_string())),
        }

        Ok(())
    }
}
