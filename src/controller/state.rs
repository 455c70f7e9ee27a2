use super::client::RecorderClient;
use crate::session::SessionTracker;
use crate::settings::SettingsStore;
use std::sync::Arc;

/// Shared state for controller handlers
#[derive(Clone)]
pub struct ControllerState {
    pub settings: Arc<SettingsStore>,
    pub sessions: Arc<SessionTracker>,
    pub recorder: RecorderClient,
}

impl ControllerState {
    pub fn new(
        settings: Arc<SettingsStore>,
        sessions: Arc<SessionTracker>,
        recorder: RecorderClient,
    ) -> Self {
        Self {
            settings,
            sessions,
            recorder,
        }
    }
}
