//! Commands for the narration playback context.

use mathviz_core::command::Command;
use serde::Deserialize;
use uuid::Uuid;

use super::aggregates::PresentationMode;

/// A user or timer intent against a loaded playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlaybackCommand {
    /// Begin or resume playback.
    Start,
    /// Pause playback without moving.
    Pause,
    /// Move forward one line.
    Advance,
    /// Move backward one line.
    Retreat,
    /// Report time elapsed since the current line finished narrating.
    Tick {
        /// Elapsed milliseconds.
        elapsed_ms: u64,
    },
    /// Switch between inline and presenter layouts.
    SetMode {
        /// The target mode.
        mode: PresentationMode,
    },
    /// Seek to the first line of a section.
    JumpTo {
        /// Section index.
        section: usize,
    },
    /// Seek to a specific line.
    JumpToLine {
        /// Section index.
        section: usize,
        /// Line index within the section.
        line: usize,
    },
    /// Return to the first line, keeping the script loaded.
    Reset,
    /// Unload the script.
    Close,
}

impl PlaybackCommand {
    /// Stable name used in logs.
    #[must_use]
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Advance => "advance",
            Self::Retreat => "retreat",
            Self::Tick { .. } => "tick",
            Self::SetMode { .. } => "set_mode",
            Self::JumpTo { .. } => "jump_to",
            Self::JumpToLine { .. } => "jump_to_line",
            Self::Reset => "reset",
            Self::Close => "close",
        }
    }
}

/// A playback command addressed to one session.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackRequest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The intent.
    pub command: PlaybackCommand,
}

impl PlaybackRequest {
    /// Wraps a command with a fresh correlation ID.
    #[must_use]
    pub fn new(command: PlaybackCommand) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            command,
        }
    }
}

impl Command for PlaybackRequest {
    fn command_type(&self) -> &'static str {
        self.command.command_type()
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
