//! Read models published to observers.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{PlaybackEngine, PlaybackPhase, PlaybackState};
use crate::domain::script::{Difficulty, LineMeta, NarrationScript};

/// The line currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineView {
    /// Id of the section the line belongs to.
    pub section_id: String,
    /// Section type tag.
    pub section_kind: String,
    /// Line id.
    pub line_id: String,
    /// Subtitle text.
    pub text: String,
    /// Presentation hints.
    #[serde(flatten)]
    pub meta: LineMeta,
}

/// A complete, immutable view of one session after a transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    /// The session this snapshot belongs to.
    pub session_id: Uuid,
    /// Engine version; increases with every applied event.
    pub version: i64,
    /// Publish counter; increases with every snapshot the session sends,
    /// including timer arm and disarm.
    pub revision: u64,
    /// Id of the loaded script, if any.
    pub script_id: Option<String>,
    /// Lifecycle phase.
    pub phase: PlaybackPhase,
    /// Position, mode and running flag.
    pub state: PlaybackState,
    /// The current line, if a script is loaded.
    pub line: Option<LineView>,
    /// One-based number of the current line across the script; zero when idle.
    pub line_number: usize,
    /// Number of lines in the script; zero when idle.
    pub total_lines: usize,
    /// Indices of sections advanced past.
    pub completed_sections: Vec<usize>,
    /// Whether an auto-advance timer is pending.
    pub timer_armed: bool,
}

impl PlaybackSnapshot {
    /// Captures the engine's current state.
    #[must_use]
    pub fn capture(engine: &PlaybackEngine, timer_armed: bool, revision: u64) -> Self {
        use mathviz_core::aggregate::AggregateRoot;

        let state = engine.state();
        let script = engine.script();
        let line = script.and_then(|s| {
            s.line_at(state.position()).map(|(section, line)| LineView {
                section_id: section.id.clone(),
                section_kind: section.kind.as_str().to_owned(),
                line_id: line.id.clone(),
                text: line.text.clone(),
                meta: line.meta.clone(),
            })
        });

        Self {
            session_id: engine.aggregate_id(),
            version: engine.version(),
            revision,
            script_id: script.map(|s| s.id.clone()),
            phase: engine.phase(),
            state,
            line_number: script.map_or(0, |s| s.flat_index(state.position()) + 1),
            total_lines: script.map_or(0, |s| s.total_lines()),
            line,
            completed_sections: engine.completed_sections().iter().copied().collect(),
            timer_armed,
        }
    }

    /// The id of the section on screen, which keys scene resolution.
    #[must_use]
    pub fn section_id(&self) -> Option<&str> {
        self.line.as_ref().map(|l| l.section_id.as_str())
    }
}

/// Section entry in a script outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutline {
    /// Section id.
    pub id: String,
    /// Section type tag.
    pub kind: String,
    /// Display title.
    pub title: Option<String>,
    /// Number of lines.
    pub line_count: usize,
}

/// Table-of-contents view of a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptOutline {
    /// Script id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// Difficulty level.
    pub difficulty: Option<Difficulty>,
    /// Sections in order.
    pub sections: Vec<SectionOutline>,
    /// Number of lines across all sections.
    pub total_lines: usize,
}

impl From<&NarrationScript> for ScriptOutline {
    fn from(script: &NarrationScript) -> Self {
        Self {
            id: script.id.clone(),
            title: script.title.clone(),
            subtitle: script.subtitle.clone(),
            difficulty: script.difficulty,
            sections: script
                .sections
                .iter()
                .map(|s| SectionOutline {
                    id: s.id.clone(),
                    kind: s.kind.as_str().to_owned(),
                    title: s.title.clone(),
                    line_count: s.lines.len(),
                })
                .collect(),
            total_lines: script.total_lines(),
        }
    }
}
