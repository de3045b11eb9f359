//! Scene binding registry: (course, section, learner parameters) →
//! (rendering unit, derived state).
//!
//! Built once at startup from two explicit tables, course → scene config and
//! course → rendering unit, plus the manifest's exemption lists. Resolution
//! never fails: an incomplete registration degrades to the placeholder unit.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use mathviz_core::course::CourseId;
use serde::Serialize;
use tracing::warn;

use crate::domain::config::{SceneConfig, SceneParameters, SceneState};
use crate::domain::manifest::RegistryManifest;
use crate::domain::renderer::{
    DefaultRenderer, DrawInstruction, PlaceholderRenderer, SceneRenderer,
};

/// Why a resolution fell back to the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    /// The course has no scene config in the presenter map.
    MissingSceneConfig,
    /// The course is neither in the custom-renderer list nor special-cased.
    NotInCustomList,
    /// The factory table has no unit for the course.
    MissingRenderer,
}

impl fmt::Display for PlaceholderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingSceneConfig => "no scene config registered",
            Self::NotInCustomList => "not in the custom-renderer list",
            Self::MissingRenderer => "no renderer registered in the factory",
        })
    }
}

/// Which path produced a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum BindingKind {
    /// The course's own unit.
    Custom,
    /// The shared default unit.
    Default,
    /// The placeholder, because of a registration defect.
    Placeholder {
        /// The defect.
        reason: PlaceholderReason,
    },
}

/// A resolved (rendering unit, derived state) pair.
#[derive(Debug, Clone)]
pub struct SceneBinding {
    /// The rendering unit.
    pub renderer: Arc<dyn SceneRenderer>,
    /// The state to draw.
    pub state: SceneState,
    /// How the binding was resolved.
    pub kind: BindingKind,
}

impl SceneBinding {
    /// Renders the bound state.
    #[must_use]
    pub fn draw(&self) -> DrawInstruction {
        self.renderer.render(&self.state)
    }
}

impl PartialEq for SceneBinding {
    fn eq(&self, other: &Self) -> bool {
        self.renderer.name() == other.renderer.name()
            && self.state == other.state
            && self.kind == other.kind
    }
}

/// The runtime lookup tables.
#[derive(Debug, Clone)]
pub struct SceneRegistry {
    scene_configs: HashMap<CourseId, Arc<SceneConfig>>,
    renderers: HashMap<CourseId, Arc<dyn SceneRenderer>>,
    default_courses: BTreeSet<CourseId>,
    special_courses: BTreeSet<CourseId>,
    custom_courses: BTreeSet<CourseId>,
    default_renderer: Arc<dyn SceneRenderer>,
    placeholder: Arc<dyn SceneRenderer>,
}

impl SceneRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> SceneRegistryBuilder {
        SceneRegistryBuilder::default()
    }

    /// Resolves the binding for a section.
    ///
    /// Order: default-rendered courses get the shared unit and a generic
    /// state; otherwise the course needs a scene config, a place in the
    /// custom-renderer list (unless special-cased) and a factory entry, and
    /// the first missing piece selects the placeholder.
    #[must_use]
    pub fn resolve(
        &self,
        course_id: &CourseId,
        section_id: &str,
        learner: &SceneParameters,
    ) -> SceneBinding {
        if self.default_courses.contains(course_id) {
            return SceneBinding {
                renderer: Arc::clone(&self.default_renderer),
                state: SceneState::generic(course_id, section_id),
                kind: BindingKind::Default,
            };
        }

        let Some(config) = self.scene_configs.get(course_id) else {
            return self.placeholder(course_id, section_id, PlaceholderReason::MissingSceneConfig);
        };
        if !self.special_courses.contains(course_id) && !self.custom_courses.contains(course_id) {
            return self.placeholder(course_id, section_id, PlaceholderReason::NotInCustomList);
        }
        let Some(renderer) = self.renderers.get(course_id) else {
            return self.placeholder(course_id, section_id, PlaceholderReason::MissingRenderer);
        };

        SceneBinding {
            renderer: Arc::clone(renderer),
            state: config.derive(course_id, section_id, learner),
            kind: BindingKind::Custom,
        }
    }

    /// The scene config registered for a course.
    #[must_use]
    pub fn scene_config(&self, course_id: &CourseId) -> Option<&SceneConfig> {
        self.scene_configs.get(course_id).map(Arc::as_ref)
    }

    /// Number of courses with a registered unit.
    #[must_use]
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    fn placeholder(
        &self,
        course_id: &CourseId,
        section_id: &str,
        reason: PlaceholderReason,
    ) -> SceneBinding {
        warn!(course_id = %course_id, section_id, %reason, "registration defect; showing placeholder");
        SceneBinding {
            renderer: Arc::clone(&self.placeholder),
            state: SceneState::loading(course_id, section_id),
            kind: BindingKind::Placeholder { reason },
        }
    }
}

/// Assembles a [`SceneRegistry`].
#[derive(Debug, Default)]
pub struct SceneRegistryBuilder {
    scene_configs: HashMap<CourseId, Arc<SceneConfig>>,
    renderers: HashMap<CourseId, Arc<dyn SceneRenderer>>,
    default_courses: BTreeSet<CourseId>,
    special_courses: BTreeSet<CourseId>,
    custom_courses: BTreeSet<CourseId>,
}

impl SceneRegistryBuilder {
    /// Copies the exemption and custom-renderer lists from a manifest.
    #[must_use]
    pub fn manifest(mut self, manifest: &RegistryManifest) -> Self {
        self.default_courses.extend(manifest.default_renderer.iter().cloned());
        self.special_courses.extend(manifest.special_handling.iter().cloned());
        self.custom_courses.extend(manifest.custom_renderer.iter().cloned());
        self
    }

    /// Registers a course's scene config.
    #[must_use]
    pub fn scene_config(mut self, course_id: CourseId, config: SceneConfig) -> Self {
        self.scene_configs.insert(course_id, Arc::new(config));
        self
    }

    /// Registers a course's rendering unit in the factory table.
    #[must_use]
    pub fn renderer(mut self, course_id: CourseId, renderer: Arc<dyn SceneRenderer>) -> Self {
        self.renderers.insert(course_id, renderer);
        self
    }

    /// Marks a course as drawn by the shared default unit.
    #[must_use]
    pub fn default_course(mut self, course_id: CourseId) -> Self {
        self.default_courses.insert(course_id);
        self
    }

    /// Marks a course as special-cased.
    #[must_use]
    pub fn special_course(mut self, course_id: CourseId) -> Self {
        self.special_courses.insert(course_id);
        self
    }

    /// Adds a course to the custom-renderer list.
    #[must_use]
    pub fn custom_course(mut self, course_id: CourseId) -> Self {
        self.custom_courses.insert(course_id);
        self
    }

    /// Freezes the tables.
    #[must_use]
    pub fn build(self) -> SceneRegistry {
        SceneRegistry {
            scene_configs: self.scene_configs,
            renderers: self.renderers,
            default_courses: self.default_courses,
            special_courses: self.special_courses,
            custom_courses: self.custom_courses,
            default_renderer: Arc::new(DefaultRenderer),
            placeholder: Arc::new(PlaceholderRenderer),
        }
    }
}
