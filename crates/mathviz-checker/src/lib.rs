//! MathViz — build-time course registration checker.
//!
//! Every course in the script directory must be wired through five places:
//! its script, a scene config, a renderer, a factory entry, and a presenter
//! entry (plus the custom-renderer list unless exempt). [`check_catalog`]
//! evaluates those facts with the same lookup order the runtime uses and
//! returns a [`CheckReport`] whose `Display` is the CLI's stdout.

pub mod check;
pub mod config;
pub mod report;

pub use check::{CheckOptions, check_catalog};
pub use config::{CheckerConfig, ConfigError};
pub use report::{CheckReport, CourseReport, Requirement, Violation};
