//! The narrated course script model.
//!
//! A script is authored once per course as JSON or YAML and consumed as-is
//! by the playback engine. The model itself has no behavior beyond
//! structural validation and position arithmetic over its lines.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use mathviz_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A complete narrated course script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationScript {
    /// Course identifier; must equal the course's registration key.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Optional subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Audience difficulty level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Free-form target audience description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age: Option<String>,
    /// Learning objectives.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<String>,
    /// Assumed prior knowledge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    /// Ordered sections.
    pub sections: Vec<Section>,
}

/// Audience difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Elementary,
    Intermediate,
    Advanced,
    Expert,
}

/// A named phase of a course's narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section id, unique within the script. Also the scene-config key.
    pub id: String,
    /// Authoring tag; never used for control flow.
    #[serde(rename = "type", default)]
    pub kind: SectionKind,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Default trigger for the section's lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    /// Ordered lines.
    pub lines: Vec<Line>,
}

/// Section type tag. Open: unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Intro,
    #[default]
    Concept,
    Formula,
    Animation,
    Interaction,
    Example,
    Application,
    Summary,
    Other(String),
}

impl SectionKind {
    /// The wire name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Intro => "intro",
            Self::Concept => "concept",
            Self::Formula => "formula",
            Self::Animation => "animation",
            Self::Interaction => "interaction",
            Self::Example => "example",
            Self::Application => "application",
            Self::Summary => "summary",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for SectionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "intro" => Self::Intro,
            "concept" => Self::Concept,
            "formula" => Self::Formula,
            "animation" => Self::Animation,
            "interaction" => Self::Interaction,
            "example" => Self::Example,
            "application" => Self::Application,
            "summary" => Self::Summary,
            _ => Self::Other(value),
        }
    }
}

impl From<SectionKind> for String {
    fn from(value: SectionKind) -> Self {
        value.as_str().to_owned()
    }
}

/// One atomic unit of narrated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Line id, unique within its section. Also names the audio clip.
    pub id: String,
    /// Narrated text, shown as the subtitle.
    pub text: String,
    /// Overrides the section trigger for this line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    /// Presentation hints.
    #[serde(flatten)]
    pub meta: LineMeta,
}

/// Optional per-line presentation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineMeta {
    /// UI element or sub-state to highlight while the line plays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    /// Related formula (LaTeX).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Pause after the line, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause: Option<f64>,
    /// Audio length in seconds, filled in once audio exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Animation cue fired when the line starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationCue>,
}

/// An animation cue for the surrounding experiment component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationCue {
    /// Action name, e.g. `setParams` or `startAnimation`.
    pub action: String,
    /// Action parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Delay before the cue fires, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

/// Rule governing whether a line advances on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trigger {
    /// Advance once the narrator reports the line finished, after `delay_ms`.
    #[serde(alias = "animation", alias = "parameter")]
    Auto {
        /// Extra delay in milliseconds.
        #[serde(default, rename = "delay")]
        delay_ms: u64,
    },
    /// Advance only on explicit user action.
    Manual,
}

impl Trigger {
    /// `auto` with no extra delay, the trigger of a section that declares none.
    pub const DEFAULT: Self = Self::Auto { delay_ms: 0 };

    /// The extra delay for `auto`, `None` for `manual`.
    #[must_use]
    pub fn delay(self) -> Option<Duration> {
        match self {
            Self::Auto { delay_ms } => Some(Duration::from_millis(delay_ms)),
            Self::Manual => None,
        }
    }
}

/// A (section, line) coordinate inside a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Section index.
    pub section: usize,
    /// Line index within the section.
    pub line: usize,
}

impl Position {
    /// The first line of the first section.
    pub const ORIGIN: Self = Self { section: 0, line: 0 };

    /// Creates a position.
    #[must_use]
    pub const fn new(section: usize, line: usize) -> Self {
        Self { section, line }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.line)
    }
}

/// Source encoding of a script file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Json,
    Yaml,
}

impl ScriptFormat {
    /// Maps a file extension to a format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl NarrationScript {
    /// Parses a script from source text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedScript` (keyed by `source_name`) if the
    /// text does not decode into a script.
    pub fn parse(source: &str, format: ScriptFormat, source_name: &str) -> Result<Self, DomainError> {
        let parsed = match format {
            ScriptFormat::Json => serde_json::from_str(source).map_err(|e| e.to_string()),
            ScriptFormat::Yaml => serde_yaml::from_str(source).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| DomainError::malformed(source_name, reason))
    }

    /// Checks the structural invariants the playback engine relies on.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedScript` if the id is empty, there are
    /// no sections, a section has no lines, or section ids (script-wide) or
    /// line ids (section-wide) are empty or repeated.
    pub fn validate(&self) -> Result<(), DomainError> {
        let malformed = |reason: String| DomainError::malformed(&self.id, reason);

        if self.id.trim().is_empty() {
            return Err(malformed("script id is empty".to_owned()));
        }
        if self.sections.is_empty() {
            return Err(malformed("script has no sections".to_owned()));
        }

        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if section.id.trim().is_empty() {
                return Err(malformed("section id is empty".to_owned()));
            }
            if !section_ids.insert(section.id.as_str()) {
                return Err(malformed(format!("duplicate section id '{}'", section.id)));
            }
            if section.lines.is_empty() {
                return Err(malformed(format!("section '{}' has no lines", section.id)));
            }

            let mut line_ids = HashSet::new();
            for line in &section.lines {
                if line.id.trim().is_empty() {
                    return Err(malformed(format!(
                        "section '{}' has a line with an empty id",
                        section.id
                    )));
                }
                if !line_ids.insert(line.id.as_str()) {
                    return Err(malformed(format!(
                        "duplicate line id '{}' in section '{}'",
                        line.id, section.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validates the script and checks it is registered under `course_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedScript` on any structural violation or
    /// when the script id differs from the registration key.
    pub fn validate_for(&self, course_id: &str) -> Result<(), DomainError> {
        self.validate()?;
        if self.id != course_id {
            return Err(DomainError::malformed(
                course_id,
                format!("script id '{}' does not match course id '{course_id}'", self.id),
            ));
        }
        Ok(())
    }

    /// Total number of lines across all sections.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Index of a section by id.
    #[must_use]
    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    /// The line at `position`, with its section.
    #[must_use]
    pub fn line_at(&self, position: Position) -> Option<(&Section, &Line)> {
        let section = self.sections.get(position.section)?;
        let line = section.lines.get(position.line)?;
        Some((section, line))
    }

    /// Whether `position` addresses an existing line.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.line_at(position).is_some()
    }

    /// The final line of the final section.
    #[must_use]
    pub fn last_position(&self) -> Position {
        let section = self.sections.len().saturating_sub(1);
        let line = self
            .sections
            .last()
            .map_or(0, |s| s.lines.len().saturating_sub(1));
        Position::new(section, line)
    }

    /// The line after `position`, crossing into the next section if needed.
    #[must_use]
    pub fn next_position(&self, position: Position) -> Option<Position> {
        let section = self.sections.get(position.section)?;
        if position.line + 1 < section.lines.len() {
            return Some(Position::new(position.section, position.line + 1));
        }
        let next_section = position.section + 1;
        self.sections
            .get(next_section)
            .filter(|s| !s.lines.is_empty())
            .map(|_| Position::new(next_section, 0))
    }

    /// The line before `position`, crossing into the previous section's last
    /// line if needed.
    #[must_use]
    pub fn previous_position(&self, position: Position) -> Option<Position> {
        if position.line > 0 {
            return Some(Position::new(position.section, position.line - 1));
        }
        let previous_section = position.section.checked_sub(1)?;
        let section = self.sections.get(previous_section)?;
        let line = section.lines.len().checked_sub(1)?;
        Some(Position::new(previous_section, line))
    }

    /// Zero-based index of `position` when all lines are laid end to end.
    #[must_use]
    pub fn flat_index(&self, position: Position) -> usize {
        let before: usize = self
            .sections
            .iter()
            .take(position.section)
            .map(|s| s.lines.len())
            .sum();
        before + position.line
    }

    /// The position of the `index`-th line when all lines are laid end to end.
    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<Position> {
        let mut remaining = index;
        for (section_index, section) in self.sections.iter().enumerate() {
            if remaining < section.lines.len() {
                return Some(Position::new(section_index, remaining));
            }
            remaining -= section.lines.len();
        }
        None
    }

    /// The trigger in effect for the line at `position`: the line's own,
    /// else its section's, else `auto` with no delay.
    #[must_use]
    pub fn effective_trigger(&self, position: Position) -> Option<Trigger> {
        let (section, line) = self.line_at(position)?;
        Some(line.trigger.or(section.trigger).unwrap_or(Trigger::DEFAULT))
    }
}
