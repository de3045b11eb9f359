//! Course identifiers and the file-naming rule derived from them.
//!
//! A course id is the hyphen-case join key shared by the script directory,
//! the scene-config directory, the renderer directory and the two presenter
//! tables. Scene-config and renderer names are derived from it
//! deterministically; the candidate lists produced here are the single
//! source of truth for both the runtime loader and the consistency checker.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Trailing tokens that are dropped when deriving the contracted short form
/// (`conic-sections` → `conic`, `quadratic-function` → `quadratic`).
pub const CONTRACTED_SUFFIXES: [&str; 2] = ["sections", "function"];

/// Suffix appended to derived scene-config file stems.
pub const SCENE_CONFIG_SUFFIX: &str = "Scenes";

/// Suffix appended to derived file-form renderer stems.
pub const RENDERER_SUFFIX: &str = "SceneRenderer";

/// A validated hyphen-case course identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(String);

impl CourseId {
    /// Parses a course id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCourseId` unless the id is one or more
    /// lowercase ASCII alphanumeric tokens joined by single hyphens and
    /// starting with a letter.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let starts_with_letter = raw.chars().next().is_some_and(|c| c.is_ascii_lowercase());
        let tokens_ok = raw.split('-').all(|token| {
            !token.is_empty()
                && token
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        if starts_with_letter && tokens_ok {
            Ok(Self(raw.to_owned()))
        } else {
            Err(DomainError::InvalidCourseId(raw.to_owned()))
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `conic-sections` → `conicSections`.
    #[must_use]
    pub fn camel_name(&self) -> String {
        camel_case(&self.0)
    }

    /// `conic-sections` → `ConicSections`.
    #[must_use]
    pub fn pascal_name(&self) -> String {
        pascal_case(&self.0)
    }

    /// The id with a trailing `-sections` / `-function` token dropped, if it
    /// has one and something remains.
    #[must_use]
    pub fn contracted(&self) -> Option<&str> {
        CONTRACTED_SUFFIXES.iter().find_map(|suffix| {
            self.0
                .strip_suffix(suffix)
                .and_then(|rest| rest.strip_suffix('-'))
                .filter(|rest| !rest.is_empty())
        })
    }

    /// Scene-config file stems in lookup order: the raw id, the camel-case
    /// name, then the contracted camel-case name, each with `Scenes`
    /// appended. Duplicates are removed while keeping the first occurrence.
    #[must_use]
    pub fn scene_config_stems(&self) -> Vec<String> {
        let mut names = vec![self.0.clone(), self.camel_name()];
        if let Some(short) = self.contracted() {
            names.push(camel_case(short));
        }
        dedup_in_order(
            names
                .into_iter()
                .map(|name| format!("{name}{SCENE_CONFIG_SUFFIX}"))
                .collect(),
        )
    }

    /// Renderer names in lookup order: the Pascal-case name, then the
    /// contracted Pascal-case name. Callers try each as a directory first and
    /// as a `<Name>SceneRenderer` file second.
    #[must_use]
    pub fn renderer_names(&self) -> Vec<String> {
        let mut names = vec![self.pascal_name()];
        if let Some(short) = self.contracted() {
            names.push(pascal_case(short));
        }
        dedup_in_order(names)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CourseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CourseId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.0
    }
}

impl std::str::FromStr for CourseId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Converts hyphen-case to camel-case.
#[must_use]
pub fn camel_case(hyphenated: &str) -> String {
    let mut out = String::with_capacity(hyphenated.len());
    let mut upper_next = false;
    for c in hyphenated.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts hyphen-case to Pascal-case.
#[must_use]
pub fn pascal_case(hyphenated: &str) -> String {
    let camel = camel_case(hyphenated);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn dedup_in_order(names: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
