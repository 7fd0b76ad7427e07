use std::sync::{Mutex, MutexGuard, PoisonError};

use glimpse_config::Config;
use glimpse_types::SessionId;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::profile::ConfigPaths;
use crate::status::AppStatus;

/// The one capture + analysis allowed to run
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub id: SessionId,
    pub cancel: CancellationToken,
}

pub struct AppState {
    pub config: RwLock<Config>,
    pub status: AppStatus,
    pub paths: ConfigPaths,
    pub profile: String,
    active: Mutex<Option<ActiveSession>>,
}

impl AppState {
    pub fn new(config: Config, paths: ConfigPaths, profile: impl Into<String>) -> Self {
        Self {
            config: RwLock::new(config),
            status: AppStatus::new(),
            paths,
            profile: profile.into(),
            active: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the running session and register a fresh one under `parent`
    pub fn begin_session(&self, parent: &CancellationToken) -> ActiveSession {
        let session = ActiveSession {
            id: SessionId::new(),
            cancel: parent.child_token(),
        };

        if let Some(previous) = self.slot().replace(session.clone()) {
            tracing::debug!("Session {} superseded by {}", previous.id, session.id);
            previous.cancel.cancel();
        }
        session
    }

    pub fn cancel_active(&self) -> Option<SessionId> {
        let previous = self.slot().take()?;
        previous.cancel.cancel();
        Some(previous.id)
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.slot().as_ref().map(|s| s.id)
    }

    /// Clear the slot if `id` still owns it
    pub fn end_session(&self, id: SessionId) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|s| s.id == id) {
            *slot = None;
        }
    }
}
