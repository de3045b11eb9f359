//! Per-course scene configuration and the visual state derived from it.

use std::collections::BTreeMap;

use mathviz_core::course::CourseId;
use serde::{Deserialize, Serialize};

/// Learner-adjustable and default parameters, keyed by name.
pub type SceneParameters = BTreeMap<String, serde_json::Value>;

/// The kind of picture a section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Title,
    Text,
    Waveform,
    Spectrum,
    Formula,
    Comparison,
    Animation,
    Interactive,
    Application,
    #[default]
    Illustration,
    Summary,
}

impl SceneKind {
    /// Best-effort kind for a section known only by id.
    #[must_use]
    pub fn for_section_id(section_id: &str) -> Self {
        match section_id {
            "intro" | "title" | "opening" => Self::Title,
            "summary" | "recap" | "outro" => Self::Summary,
            "formula" | "formulas" => Self::Formula,
            "application" | "applications" => Self::Application,
            _ => Self::Illustration,
        }
    }
}

/// Scene settings for one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScene {
    /// What kind of picture to draw.
    #[serde(default)]
    pub kind: SceneKind,
    /// Parameters that override the course defaults for this section.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: SceneParameters,
    /// Layer or parameter names to emphasize.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlight: Vec<String>,
}

/// A course's scene config: section id → scene settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Parameters shared by every section.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: SceneParameters,
    /// Per-section settings. Keys are script section ids.
    #[serde(default)]
    pub sections: BTreeMap<String, SectionScene>,
}

impl SceneConfig {
    /// Derives the visual state for a section.
    ///
    /// Parameters are layered: course defaults, then the section's own, then
    /// the learner's. A section with no entry gets the defaults and a kind
    /// guessed from its id.
    #[must_use]
    pub fn derive(
        &self,
        course_id: &CourseId,
        section_id: &str,
        learner: &SceneParameters,
    ) -> SceneState {
        let section = self.sections.get(section_id);
        let mut params = self.defaults.clone();
        if let Some(section) = section {
            params.extend(section.params.clone());
        }
        params.extend(learner.clone());

        SceneState {
            course_id: course_id.clone(),
            section_id: section_id.to_owned(),
            kind: section.map_or_else(|| SceneKind::for_section_id(section_id), |s| s.kind),
            params,
            highlight: section.map(|s| s.highlight.clone()).unwrap_or_default(),
        }
    }

    /// Section ids this config binds.
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// The derived visual state handed to a rendering unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneState {
    /// Course the scene belongs to.
    pub course_id: CourseId,
    /// Section being narrated.
    pub section_id: String,
    /// What kind of picture to draw.
    pub kind: SceneKind,
    /// Fully layered parameters.
    pub params: SceneParameters,
    /// Names to emphasize.
    pub highlight: Vec<String>,
}

impl SceneState {
    /// The state the shared default unit draws: built from the section id alone.
    #[must_use]
    pub fn generic(course_id: &CourseId, section_id: &str) -> Self {
        let mut params = SceneParameters::new();
        params.insert("section".to_owned(), section_id.into());
        Self {
            course_id: course_id.clone(),
            section_id: section_id.to_owned(),
            kind: SceneKind::for_section_id(section_id),
            params,
            highlight: Vec::new(),
        }
    }

    /// The "content loading" state shown in place of a missing registration.
    #[must_use]
    pub fn loading(course_id: &CourseId, section_id: &str) -> Self {
        let mut params = SceneParameters::new();
        params.insert("status".to_owned(), "loading".into());
        Self {
            course_id: course_id.clone(),
            section_id: section_id.to_owned(),
            kind: SceneKind::Text,
            params,
            highlight: Vec::new(),
        }
    }
}
