//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use mathviz_core::error::DomainError;
use mathviz_core::event::Clock;
use mathviz_narration::application::session::NarrationSession;
use mathviz_narration::domain::repository::ScriptRepository;
use mathviz_scenes::application::registry::SceneRegistry;
use uuid::Uuid;

use crate::store::SessionStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Timestamps for playback events.
    pub clock: Arc<dyn Clock>,
    /// Course scripts.
    pub scripts: Arc<dyn ScriptRepository>,
    /// Scene bindings, built once at startup.
    pub scenes: Arc<SceneRegistry>,
    /// Live sessions by id.
    pub sessions: SessionStore,
    /// Cap on how long a watch request blocks.
    pub wait_timeout: Duration,
}

impl AppState {
    /// Create new application state with no sessions.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        scripts: Arc<dyn ScriptRepository>,
        scenes: Arc<SceneRegistry>,
        wait_timeout: Duration,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            clock,
            scripts,
            scenes,
            sessions: SessionStore::new(idle_ttl),
            wait_timeout,
        }
    }

    /// Looks up a live session and marks it as used.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session has this id.
    pub async fn session(&self, session_id: Uuid) -> Result<NarrationSession, DomainError> {
        self.sessions.get(session_id).await
    }
}
