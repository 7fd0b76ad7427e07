use anyhow::Result;

use crate::backend::ProcessId;

/// Hands focus back to the application that had it before our window
pub trait FocusControl: Send + Sync {
    /// Bring the application owning `pid` back to the front. Must not block
    fn activate(&self, pid: ProcessId) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFocus;

impl SystemFocus {
    pub fn new() -> Self {
        Self
    }
}

impl FocusControl for SystemFocus {
    #[cfg(target_os = "macos")]
    fn activate(&self, pid: ProcessId) -> Result<()> {
        use anyhow::Context;

        let script = format!(
            "tell application \"System Events\" to set frontmost of (first process whose unix id is {pid}) to true"
        );
        // The script can take a few hundred ms, reap it off the UI thread
        let mut child = std::process::Command::new("osascript")
            .arg("-e")
            .arg(script)
            .spawn()
            .context("Failed to spawn osascript")?;
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::warn!("osascript did not finish: {}", e);
            }
        });
        Ok(())
    }

    #[cfg(not(target_os = "macos"))]
    fn activate(&self, pid: ProcessId) -> Result<()> {
        tracing::debug!("Focus restore for pid {} not supported on this platform", pid);
        Ok(())
    }
}
