//! Environment configuration for the `course-check` binary.

use std::path::PathBuf;

use thiserror::Error;

use crate::check::CheckOptions;

/// Default course root, relative to the working directory.
pub const DEFAULT_COURSE_ROOT: &str = "courses";

/// An environment variable holds an unusable value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// Settings read from `COURSE_ROOT` and `COURSE_CHECK_ALLOW_PENDING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    pub course_root: PathBuf,
    pub options: CheckOptions,
}

impl CheckerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `COURSE_CHECK_ALLOW_PENDING` is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `COURSE_CHECK_ALLOW_PENDING` is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let course_root = lookup("COURSE_ROOT")
            .filter(|root| !root.is_empty())
            .unwrap_or_else(|| DEFAULT_COURSE_ROOT.to_string());
        let allow_pending = match lookup("COURSE_CHECK_ALLOW_PENDING").as_deref() {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(ConfigError(format!(
                    "COURSE_CHECK_ALLOW_PENDING must be true or false, got {other:?}"
                )));
            }
        };
        Ok(Self {
            course_root: PathBuf::from(course_root),
            options: CheckOptions { allow_pending },
        })
    }
}
