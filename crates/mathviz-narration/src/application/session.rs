//! Session handle: owns one playback engine, its auto-advance timer and the
//! channel observers read snapshots from.
//!
//! All mutation happens while holding the session lock, and a snapshot is
//! published only once every event of a transition has been applied, so an
//! observer can never see half of a move.

use std::sync::{Arc, Weak};
use std::time::Duration;

use mathviz_core::aggregate::AggregateRoot;
use mathviz_core::command::Command;
use mathviz_core::course::CourseId;
use mathviz_core::error::DomainError;
use mathviz_core::event::{Clock, DomainEvent};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::views::{LineView, PlaybackSnapshot};
use crate::domain::aggregates::{PlaybackEngine, PlaybackPhase};
use crate::domain::commands::{PlaybackCommand, PlaybackRequest};
use crate::domain::events::PlaybackEventKind;
use crate::domain::script::{NarrationScript, Trigger};

/// A cloneable handle to one narration session.
#[derive(Clone)]
pub struct NarrationSession {
    id: Uuid,
    inner: Arc<Mutex<SessionInner>>,
    updates: watch::Receiver<PlaybackSnapshot>,
}

impl std::fmt::Debug for NarrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationSession")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

struct SessionInner {
    engine: PlaybackEngine,
    clock: Arc<dyn Clock>,
    publisher: watch::Sender<PlaybackSnapshot>,
    timer: Option<AutoAdvanceTimer>,
    generation: u64,
    revision: u64,
}

/// A pending auto-advance. Dropping it cancels the task.
struct AutoAdvanceTimer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl NarrationSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(id: Uuid, clock: Arc<dyn Clock>) -> Self {
        let engine = PlaybackEngine::new(id);
        let (publisher, updates) = watch::channel(PlaybackSnapshot::capture(&engine, false, 0));
        let inner = SessionInner {
            engine,
            clock,
            publisher,
            timer: None,
            generation: 0,
            revision: 0,
        };
        Self {
            id,
            inner: Arc::new(Mutex::new(inner)),
            updates,
        }
    }

    /// The session id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.updates.borrow().clone()
    }

    /// The line currently on screen; `None` while idle.
    #[must_use]
    pub fn current_line(&self) -> Option<LineView> {
        self.updates.borrow().line.clone()
    }

    /// A read-only subscription to snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.updates.clone()
    }

    /// Waits until a snapshot with a revision above `revision` is published,
    /// or until `timeout` passes, and returns the latest snapshot either way.
    pub async fn wait_for_change(&self, revision: u64, timeout: Duration) -> PlaybackSnapshot {
        let mut updates = self.subscribe();
        let newer = updates.wait_for(|snapshot| snapshot.revision > revision);
        match tokio::time::timeout(timeout, newer).await {
            Ok(Ok(snapshot)) => snapshot.clone(),
            _ => self.snapshot(),
        }
    }

    /// Loads a script registered under `course_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedScript` if the script is invalid or its
    /// id differs from `course_id`. The session is left untouched.
    #[instrument(skip(self, script), fields(session_id = %self.id))]
    pub async fn load(
        &self,
        course_id: &CourseId,
        script: Arc<NarrationScript>,
        correlation_id: Uuid,
    ) -> Result<PlaybackSnapshot, DomainError> {
        script.validate_for(course_id.as_str())?;
        let mut inner = self.inner.lock().await;
        let clock = Arc::clone(&inner.clock);
        let result = inner.engine.load(script, correlation_id, clock.as_ref());
        inner.commit(result)
    }

    /// Applies a playback command.
    ///
    /// # Errors
    ///
    /// Returns the engine's error unchanged; nothing is mutated or published
    /// in that case.
    #[instrument(skip(self), fields(session_id = %self.id, command = request.command_type()))]
    pub async fn execute(&self, request: PlaybackRequest) -> Result<PlaybackSnapshot, DomainError> {
        let mut inner = self.inner.lock().await;
        let result = inner.dispatch(request);
        inner.commit(result)
    }

    /// Signals that narration of the current line finished.
    ///
    /// While playing on an `auto(delay)` line this arms the auto-advance
    /// timer, or advances at once when the delay is zero. Otherwise it only
    /// returns the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn narration_finished(&self) -> Result<PlaybackSnapshot, DomainError> {
        let mut inner = self.inner.lock().await;
        if inner.engine.phase() == PlaybackPhase::Idle {
            return Err(DomainError::SessionNotLoaded);
        }
        if inner.engine.phase() != PlaybackPhase::Playing {
            debug!("narration finished while not playing; ignoring");
            return Ok(inner.publisher.borrow().clone());
        }

        match inner.engine.current_trigger() {
            Some(Trigger::Auto { delay_ms: 0 }) => {
                let result = inner.dispatch(PlaybackRequest::new(PlaybackCommand::Tick {
                    elapsed_ms: 0,
                }));
                inner.commit(result)
            }
            Some(Trigger::Auto { delay_ms }) => {
                let delay = Duration::from_millis(delay_ms);
                inner.arm_timer(Arc::downgrade(&self.inner), delay);
                Ok(inner.publish())
            }
            _ => {
                debug!("current line is manual; waiting for user");
                Ok(inner.publisher.borrow().clone())
            }
        }
    }
}

impl SessionInner {
    fn dispatch(&mut self, request: PlaybackRequest) -> Result<(), DomainError> {
        let correlation_id = request.correlation_id();
        let clock = Arc::clone(&self.clock);
        let clock = clock.as_ref();
        let engine = &mut self.engine;
        match request.command {
            PlaybackCommand::Start => engine.start(correlation_id, clock),
            PlaybackCommand::Pause => engine.pause(correlation_id, clock),
            PlaybackCommand::Advance => engine.advance(correlation_id, clock),
            PlaybackCommand::Retreat => engine.retreat(correlation_id, clock),
            PlaybackCommand::Tick { elapsed_ms } => {
                engine.auto_advance_tick(Duration::from_millis(elapsed_ms), correlation_id, clock)
            }
            PlaybackCommand::SetMode { mode } => engine.set_mode(mode, correlation_id, clock),
            PlaybackCommand::JumpTo { section } => engine.jump_to(section, correlation_id, clock),
            PlaybackCommand::JumpToLine { section, line } => {
                engine.jump_to_line(section, line, correlation_id, clock)
            }
            PlaybackCommand::Reset => engine.reset(correlation_id, clock),
            PlaybackCommand::Close => engine.close(correlation_id, clock),
        }
    }

    /// Drains the engine's events, cancels the timer if they invalidate it
    /// and publishes one snapshot for the whole transition.
    fn commit(&mut self, result: Result<(), DomainError>) -> Result<PlaybackSnapshot, DomainError> {
        if let Err(err) = result {
            debug!(error = %err, "command rejected");
            return Err(err);
        }

        let events = self.engine.take_uncommitted_events();
        if events.is_empty() {
            return Ok(self.publisher.borrow().clone());
        }

        let mut cancel_timer = false;
        for event in &events {
            let meta = event.metadata();
            info!(
                event_type = event.event_type(),
                sequence_number = meta.sequence_number,
                correlation_id = %meta.correlation_id,
                "playback event applied"
            );
            cancel_timer |= !matches!(event.kind, PlaybackEventKind::ModeChanged(_));
        }
        if cancel_timer {
            self.generation += 1;
            if self.timer.take().is_some() {
                debug!("pending auto-advance cancelled");
            }
        }
        Ok(self.publish())
    }

    fn publish(&mut self) -> PlaybackSnapshot {
        self.revision += 1;
        let snapshot = PlaybackSnapshot::capture(&self.engine, self.timer.is_some(), self.revision);
        self.publisher.send_replace(snapshot.clone());
        snapshot
    }

    fn arm_timer(&mut self, session: Weak<Mutex<SessionInner>>, delay: Duration) {
        self.generation += 1;
        let generation = self.generation;
        let started = Instant::now();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = session.upgrade() else {
                return;
            };
            let mut inner = inner.lock().await;
            inner.fire_timer(generation, started.elapsed());
        });
        // Replacing a pending timer drops, and so aborts, the old one.
        self.timer = Some(AutoAdvanceTimer {
            generation,
            handle: Some(handle),
        });
        debug!(generation, delay_ms = delay.as_millis(), "auto-advance armed");
    }

    fn fire_timer(&mut self, generation: u64, elapsed: Duration) {
        match self.timer.as_mut() {
            Some(timer) if timer.generation == generation => {
                // The running task is this one; detach rather than abort it.
                timer.handle.take();
            }
            _ => {
                debug!(generation, "stale auto-advance ignored");
                return;
            }
        }
        self.timer = None;

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let result = self.dispatch(PlaybackRequest::new(PlaybackCommand::Tick { elapsed_ms }));
        match self.commit(result) {
            Ok(snapshot) if snapshot.timer_armed => {
                // A tick that moved nothing still has to clear `timer_armed`.
                self.publish();
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "auto-advance tick rejected"),
        }
    }
}
