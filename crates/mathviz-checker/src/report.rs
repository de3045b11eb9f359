//! Check results and their stdout rendering.

use std::fmt;

use mathviz_core::error::DomainError;

/// One part of the registration contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Requirement {
    /// The script file name is a valid course id.
    CourseId,
    /// Exactly one script exists and it loads under its course id.
    Script,
    /// A scene config exists under a derived name and parses.
    SceneConfig,
    /// The course is in the presenter's scene-config map.
    PresenterEntry,
    /// A renderer exists under a derived name and parses.
    Renderer,
    /// The renderer is registered in the factory table.
    FactoryEntry,
    /// The course is in the custom-renderer list.
    CustomRendererEntry,
    /// Every section the scene config binds exists in the script.
    SceneBindings,
}

/// A single failed requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which requirement failed.
    pub requirement: Requirement,
    /// Human-readable detail.
    pub reason: String,
}

impl Violation {
    #[must_use]
    pub fn new(requirement: Requirement, reason: impl Into<String>) -> Self {
        Self {
            requirement,
            reason: reason.into(),
        }
    }
}

/// The outcome for one script in the script directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseReport {
    /// The script's file stem (the course id when valid).
    pub course: String,
    /// On the pending-completion list; no checks ran.
    pub pending: bool,
    /// Drawn by the shared default renderer.
    pub default_renderer: bool,
    /// Failed requirements, in check order.
    pub violations: Vec<Violation>,
}

impl CourseReport {
    /// Whether every requirement held (pending courses pass vacuously).
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// The failed requirements, in check order.
    #[must_use]
    pub fn requirements(&self) -> Vec<Requirement> {
        self.violations.iter().map(|v| v.requirement).collect()
    }
}

/// The outcome of checking a whole course root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// One entry per script stem, sorted by stem.
    pub courses: Vec<CourseReport>,
    /// Problems with the manifest itself.
    pub catalog_violations: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl CheckReport {
    /// Whether the catalog is releasable.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.catalog_violations.is_empty() && self.courses.iter().all(CourseReport::passed)
    }

    /// The report for one course.
    #[must_use]
    pub fn course(&self, course: &str) -> Option<&CourseReport> {
        self.courses.iter().find(|c| c.course == course)
    }

    /// Number of courses that were checked and passed.
    #[must_use]
    pub fn complete_count(&self) -> usize {
        self.courses
            .iter()
            .filter(|c| !c.pending && c.passed())
            .count()
    }

    /// Every course violation as a `RegistrationDefect`.
    pub fn defects(&self) -> impl Iterator<Item = DomainError> + '_ {
        self.courses.iter().flat_map(|course| {
            course
                .violations
                .iter()
                .map(|v| DomainError::RegistrationDefect {
                    course_id: course.course.clone(),
                    reason: v.reason.clone(),
                })
        })
    }

    /// Total number of violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.catalog_violations.len()
            + self
                .courses
                .iter()
                .map(|c| c.violations.len())
                .sum::<usize>()
    }
}

const REGISTRATION_HINT: [&str; 5] = [
    "scripts/<course-id>.json (or .yaml)",
    "scenes/<camelName>Scenes.yaml",
    "renderers/<PascalName>/renderer.yaml or renderers/<PascalName>SceneRenderer.yaml",
    "registry.yaml `factory` entry",
    "registry.yaml `presenter` entry, plus `custom_renderer` unless default or special",
];

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        if !self.warnings.is_empty() {
            writeln!(f)?;
        }

        if !self.passed() {
            writeln!(
                f,
                "course check failed: {} problem(s)",
                self.violation_count()
            )?;
            for course in self.courses.iter().filter(|c| !c.passed()) {
                writeln!(f)?;
                writeln!(f, "{}", course.course)?;
                for violation in &course.violations {
                    writeln!(f, "  - {}", violation.reason)?;
                }
            }
            if !self.catalog_violations.is_empty() {
                writeln!(f)?;
                writeln!(f, "registry.yaml")?;
                for violation in &self.catalog_violations {
                    writeln!(f, "  - {violation}")?;
                }
            }
            writeln!(f)?;
            writeln!(f, "Every course needs:")?;
            for (n, item) in REGISTRATION_HINT.iter().enumerate() {
                writeln!(f, "  {}. {item}", n + 1)?;
            }
            return Ok(());
        }

        writeln!(f, "{} courses complete", self.complete_count())?;
        writeln!(f)?;
        for course in self.courses.iter().filter(|c| !c.pending) {
            if course.default_renderer {
                writeln!(f, "  - {} (default renderer)", course.course)?;
            } else {
                writeln!(f, "  - {}", course.course)?;
            }
        }
        Ok(())
    }
}
