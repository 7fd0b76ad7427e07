use serde::{Deserialize, Serialize};

fn default_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_save_captures() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    /// How long to wait for the first frame
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Frame slot polling interval
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_save_captures")]
    pub save_captures: bool,
    /// Where PNGs go, temp dir when unset
    pub output_dir: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            save_captures: default_save_captures(),
            output_dir: None,
        }
    }
}
