//! The registry manifest: the declared registration tables and exemption
//! lists, authored once per course root as `registry.yaml`.

use std::collections::BTreeSet;

use mathviz_core::course::CourseId;
use serde::{Deserialize, Serialize};

/// Declared course registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryManifest {
    /// Courses whose renderer is registered in the renderer factory table.
    pub factory: BTreeSet<CourseId>,
    /// Courses registered in the presenter's scene-config map.
    pub presenter: BTreeSet<CourseId>,
    /// Courses the presenter renders with their own unit.
    pub custom_renderer: BTreeSet<CourseId>,
    /// Courses drawn by the shared default unit.
    pub default_renderer: BTreeSet<CourseId>,
    /// Courses exempt from the custom-renderer list.
    pub special_handling: BTreeSet<CourseId>,
    /// Courses excluded from every check until finished. Meant to be empty.
    pub pending_completion: BTreeSet<CourseId>,
}

impl RegistryManifest {
    /// Parses a manifest from YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML error, including any invalid course id.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Whether the course uses the shared default unit.
    #[must_use]
    pub fn uses_default_renderer(&self, course_id: &CourseId) -> bool {
        self.default_renderer.contains(course_id)
    }

    /// Whether the course is exempt from the custom-renderer list.
    #[must_use]
    pub fn has_special_handling(&self, course_id: &CourseId) -> bool {
        self.special_handling.contains(course_id)
    }

    /// Whether the course is excluded from checking.
    #[must_use]
    pub fn is_pending(&self, course_id: &CourseId) -> bool {
        self.pending_completion.contains(course_id)
    }
}
