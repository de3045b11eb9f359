//! Live narration sessions, evicted once idle.
//!
//! Every lookup refreshes a session's last-touched time. A client that walks
//! away without `DELETE` is closed by [`SessionStore::evict_idle`], which the
//! server runs on an interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mathviz_core::error::DomainError;
use mathviz_narration::application::session::NarrationSession;
use mathviz_narration::domain::commands::{PlaybackCommand, PlaybackRequest};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

struct TrackedSession {
    session: NarrationSession,
    last_touched: Instant,
}

/// Sessions by id, each stamped with when it was last used.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<Uuid, TrackedSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    /// An empty store that evicts sessions untouched for `idle_ttl`.
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// How long a session may sit unused.
    #[must_use]
    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Registers a session.
    pub async fn insert(&self, session: NarrationSession) {
        let tracked = TrackedSession {
            session,
            last_touched: Instant::now(),
        };
        self.entries
            .write()
            .await
            .insert(tracked.session.id(), tracked);
    }

    /// Looks up a session and marks it as used.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session has this id.
    pub async fn get(&self, session_id: Uuid) -> Result<NarrationSession, DomainError> {
        let mut entries = self.entries.write().await;
        let tracked = entries
            .get_mut(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))?;
        tracked.last_touched = Instant::now();
        Ok(tracked.session.clone())
    }

    /// Forgets a session without closing it.
    pub async fn remove(&self, session_id: Uuid) -> Option<NarrationSession> {
        self.entries
            .write()
            .await
            .remove(&session_id)
            .map(|tracked| tracked.session)
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Closes and forgets every session idle for at least the TTL. Returns
    /// the evicted ids.
    pub async fn evict_idle(&self) -> Vec<Uuid> {
        let expired: Vec<NarrationSession> = {
            let mut entries = self.entries.write().await;
            let ids: Vec<Uuid> = entries
                .iter()
                .filter(|(_, tracked)| tracked.last_touched.elapsed() >= self.idle_ttl)
                .map(|(id, _)| *id)
                .collect();
            ids.iter()
                .filter_map(|id| entries.remove(id))
                .map(|tracked| tracked.session)
                .collect()
        };

        let mut evicted = Vec::with_capacity(expired.len());
        for session in expired {
            if let Err(err) = close(&session).await {
                warn!(session_id = %session.id(), error = %err, "closing idle session failed");
            }
            info!(session_id = %session.id(), "idle session evicted");
            evicted.push(session.id());
        }
        evicted
    }

    /// Runs [`evict_idle`](Self::evict_idle) every `period` until the
    /// returned task is aborted.
    #[must_use]
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let evicted = store.evict_idle().await;
                debug!(evicted = evicted.len(), "session sweep finished");
            }
        })
    }
}

/// Closes a session, cancelling any pending auto-advance. A session that was
/// never loaded has nothing to close.
///
/// # Errors
///
/// Returns any engine error other than `SessionNotLoaded`.
pub async fn close(session: &NarrationSession) -> Result<(), DomainError> {
    match session
        .execute(PlaybackRequest::new(PlaybackCommand::Close))
        .await
    {
        Ok(_) | Err(DomainError::SessionNotLoaded) => Ok(()),
        Err(err) => Err(err),
    }
}
