//! Domain events for the narration playback context.

use std::sync::Arc;

use mathviz_core::event::{DomainEvent, EventMetadata};
use serde::Serialize;

use super::aggregates::PresentationMode;
use super::script::{NarrationScript, Position};

/// Emitted when a script is (re)loaded into the engine.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptLoaded {
    /// The loaded script's id.
    pub script_id: String,
    /// Number of sections.
    pub section_count: usize,
    /// Number of lines across all sections.
    pub total_lines: usize,
    /// The script itself. Not part of the payload.
    #[serde(skip)]
    pub script: Arc<NarrationScript>,
}

/// Why the playback position moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCause {
    /// Forward by one line.
    Advance,
    /// Backward by one line.
    Retreat,
    /// Direct jump to a section or line.
    Seek,
}

/// Emitted when the position changes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PositionMoved {
    /// Position before the move.
    pub from: Position,
    /// Position after the move.
    pub to: Position,
    /// What caused the move.
    pub cause: MoveCause,
}

/// Emitted when the presentation mode changes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModeChanged {
    /// Previous mode.
    pub from: PresentationMode,
    /// New mode.
    pub to: PresentationMode,
}

/// Event payload variants for the narration playback context.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackEventKind {
    /// A script was loaded and playback reset to its first line.
    ScriptLoaded(ScriptLoaded),
    /// Playback started or resumed.
    Started,
    /// Playback paused.
    Paused,
    /// The position moved.
    Moved(PositionMoved),
    /// The final line was reached.
    Completed {
        /// The final position.
        at: Position,
    },
    /// The presentation mode changed.
    ModeChanged(ModeChanged),
    /// Playback returned to the first line of the loaded script.
    Reset,
    /// The session was closed and the script unloaded.
    Closed,
}

/// Domain event envelope for the narration playback context.
#[derive(Debug, Clone)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl PlaybackEventKind {
    /// The stable type name of this event kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ScriptLoaded(_) => "playback.script_loaded",
            Self::Started => "playback.started",
            Self::Paused => "playback.paused",
            Self::Moved(_) => "playback.moved",
            Self::Completed { .. } => "playback.completed",
            Self::ModeChanged(_) => "playback.mode_changed",
            Self::Reset => "playback.reset",
            Self::Closed => "playback.closed",
        }
    }
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.type_name()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
