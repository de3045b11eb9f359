//! Aggregate roots for the narration playback context.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use mathviz_core::aggregate::AggregateRoot;
use mathviz_core::error::DomainError;
use mathviz_core::event::{Clock, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{
    ModeChanged, MoveCause, PlaybackEvent, PlaybackEventKind, PositionMoved, ScriptLoaded,
};
use super::script::{NarrationScript, Position, Trigger};

/// Lifecycle phase of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// No script loaded.
    #[default]
    Idle,
    /// Script attached, at the first line, not running.
    Loaded,
    /// Running; auto triggers may advance.
    Playing,
    /// Not running, position retained.
    Paused,
    /// At the last line of the last section, not running.
    Completed,
}

/// Which playback surface is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    /// The bottom control bar.
    #[default]
    Inline,
    /// The full-screen overlay.
    Presenter,
}

/// The observable playback coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Current section index.
    pub section_index: usize,
    /// Current line index within the section.
    pub line_index: usize,
    /// Active presentation surface.
    pub mode: PresentationMode,
    /// Whether playback is running.
    pub running: bool,
}

impl PlaybackState {
    /// The current position.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.section_index, self.line_index)
    }
}

/// The playback state machine for one narration session.
///
/// Every mutation goes through [`AggregateRoot::apply`]: command methods
/// validate first, then record and apply events. A command that returns an
/// error has recorded nothing.
#[derive(Debug)]
pub struct PlaybackEngine {
    /// Aggregate identifier (the session id).
    pub id: Uuid,
    version: i64,
    script: Option<Arc<NarrationScript>>,
    phase: PlaybackPhase,
    state: PlaybackState,
    completed_sections: BTreeSet<usize>,
    uncommitted_events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Creates an idle engine.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            script: None,
            phase: PlaybackPhase::Idle,
            state: PlaybackState::default(),
            completed_sections: BTreeSet::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// The lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// The playback coordinates.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The loaded script, if any.
    #[must_use]
    pub fn script(&self) -> Option<&Arc<NarrationScript>> {
        self.script.as_ref()
    }

    /// Indices of sections the learner has advanced past.
    #[must_use]
    pub fn completed_sections(&self) -> &BTreeSet<usize> {
        &self.completed_sections
    }

    /// The trigger in effect for the current line.
    #[must_use]
    pub fn current_trigger(&self) -> Option<Trigger> {
        self.script
            .as_ref()
            .and_then(|s| s.effective_trigger(self.state.position()))
    }

    /// Loads (or reloads) a script.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedScript` if the script fails structural
    /// validation. The engine is left exactly as it was.
    pub fn load(
        &mut self,
        script: Arc<NarrationScript>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        script.validate()?;
        let payload = ScriptLoaded {
            script_id: script.id.clone(),
            section_count: script.sections.len(),
            total_lines: script.total_lines(),
            script,
        };
        self.record(PlaybackEventKind::ScriptLoaded(payload), correlation_id, clock);
        Ok(())
    }

    /// Starts or resumes playback. No-op while playing or completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn start(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        if matches!(self.phase, PlaybackPhase::Loaded | PlaybackPhase::Paused) {
            self.record(PlaybackEventKind::Started, correlation_id, clock);
        }
        Ok(())
    }

    /// Pauses playback. No-op unless playing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn pause(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        if self.phase == PlaybackPhase::Playing {
            self.record(PlaybackEventKind::Paused, correlation_id, clock);
        }
        Ok(())
    }

    /// Moves exactly one line forward.
    ///
    /// Landing on the final line, or advancing from it, completes playback.
    /// No-op once completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn advance(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        let script = Arc::clone(self.ensure_loaded()?);
        if self.phase == PlaybackPhase::Completed {
            return Ok(());
        }

        let from = self.state.position();
        let last = script.last_position();
        match script.next_position(from) {
            Some(to) => {
                self.record(
                    PlaybackEventKind::Moved(PositionMoved {
                        from,
                        to,
                        cause: MoveCause::Advance,
                    }),
                    correlation_id,
                    clock,
                );
                if to == last {
                    self.record(PlaybackEventKind::Completed { at: last }, correlation_id, clock);
                }
            }
            None => {
                self.record(PlaybackEventKind::Completed { at: from }, correlation_id, clock);
            }
        }
        Ok(())
    }

    /// Moves exactly one line backward, staying put at the first line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn retreat(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        let script = Arc::clone(self.ensure_loaded()?);
        let from = self.state.position();
        if let Some(to) = script.previous_position(from) {
            self.record(
                PlaybackEventKind::Moved(PositionMoved {
                    from,
                    to,
                    cause: MoveCause::Retreat,
                }),
                correlation_id,
                clock,
            );
        }
        Ok(())
    }

    /// Advances if running, the current line is `auto(delay)` and `elapsed`
    /// has reached the delay. Otherwise does nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn auto_advance_tick(
        &mut self,
        elapsed: Duration,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        if !self.state.running {
            return Ok(());
        }
        match self.current_trigger().and_then(Trigger::delay) {
            Some(delay) if elapsed >= delay => self.advance(correlation_id, clock),
            _ => Ok(()),
        }
    }

    /// Switches presentation surface without moving.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn set_mode(
        &mut self,
        mode: PresentationMode,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        if self.state.mode != mode {
            self.record(
                PlaybackEventKind::ModeChanged(ModeChanged {
                    from: self.state.mode,
                    to: mode,
                }),
                correlation_id,
                clock,
            );
        }
        Ok(())
    }

    /// Seeks to the first line of a section.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle and
    /// `DomainError::PositionOutOfRange` for a missing section.
    pub fn jump_to(
        &mut self,
        section_index: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.jump_to_line(section_index, 0, correlation_id, clock)
    }

    /// Seeks to a specific line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle and
    /// `DomainError::PositionOutOfRange` for a missing section or line.
    pub fn jump_to_line(
        &mut self,
        section_index: usize,
        line_index: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let script = self.ensure_loaded()?;
        let section = script
            .sections
            .get(section_index)
            .ok_or(DomainError::PositionOutOfRange {
                what: "section",
                index: section_index,
                len: script.sections.len(),
            })?;
        if line_index >= section.lines.len() {
            return Err(DomainError::PositionOutOfRange {
                what: "line",
                index: line_index,
                len: section.lines.len(),
            });
        }

        let from = self.state.position();
        let to = Position::new(section_index, line_index);
        if from != to {
            self.record(
                PlaybackEventKind::Moved(PositionMoved {
                    from,
                    to,
                    cause: MoveCause::Seek,
                }),
                correlation_id,
                clock,
            );
        }
        Ok(())
    }

    /// Returns to `Loaded` at the first line, keeping the script.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when idle.
    pub fn reset(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        let pristine = self.phase == PlaybackPhase::Loaded
            && self.state.position() == Position::ORIGIN
            && self.completed_sections.is_empty();
        if !pristine {
            self.record(PlaybackEventKind::Reset, correlation_id, clock);
        }
        Ok(())
    }

    /// Unloads the script and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotLoaded` when already idle.
    pub fn close(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        self.record(PlaybackEventKind::Closed, correlation_id, clock);
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<&Arc<NarrationScript>, DomainError> {
        match (&self.script, self.phase) {
            (Some(script), phase) if phase != PlaybackPhase::Idle => Ok(script),
            _ => Err(DomainError::SessionNotLoaded),
        }
    }

    fn record(&mut self, kind: PlaybackEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = PlaybackEvent {
            metadata: EventMetadata::next(
                kind.type_name(),
                self.id,
                self.version + 1,
                correlation_id,
                clock,
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    fn rewind(&mut self) {
        self.state.section_index = 0;
        self.state.line_index = 0;
        self.state.running = false;
        self.completed_sections.clear();
    }
}

impl AggregateRoot for PlaybackEngine {
    type Event = PlaybackEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            PlaybackEventKind::ScriptLoaded(payload) => {
                self.script = Some(Arc::clone(&payload.script));
                self.phase = PlaybackPhase::Loaded;
                self.rewind();
            }
            PlaybackEventKind::Started => {
                self.phase = PlaybackPhase::Playing;
                self.state.running = true;
            }
            PlaybackEventKind::Paused => {
                self.phase = PlaybackPhase::Paused;
                self.state.running = false;
            }
            PlaybackEventKind::Moved(moved) => {
                if moved.cause == MoveCause::Advance && moved.to.section != moved.from.section {
                    self.completed_sections.insert(moved.from.section);
                }
                self.state.section_index = moved.to.section;
                self.state.line_index = moved.to.line;
                if self.phase != PlaybackPhase::Playing {
                    self.phase = PlaybackPhase::Paused;
                }
            }
            PlaybackEventKind::Completed { at } => {
                self.state.section_index = at.section;
                self.state.line_index = at.line;
                self.state.running = false;
                self.completed_sections.insert(at.section);
                self.phase = PlaybackPhase::Completed;
            }
            PlaybackEventKind::ModeChanged(change) => {
                self.state.mode = change.to;
            }
            PlaybackEventKind::Reset => {
                self.phase = PlaybackPhase::Loaded;
                self.rewind();
            }
            PlaybackEventKind::Closed => {
                self.script = None;
                self.phase = PlaybackPhase::Idle;
                self.rewind();
                self.state.mode = PresentationMode::Inline;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
