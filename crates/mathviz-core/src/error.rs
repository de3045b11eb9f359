//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Engine-level variants are local and recoverable: the call that produced
/// them performed no mutation and may be retried with valid arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A script failed structural validation at load time.
    #[error("malformed script '{script_id}': {reason}")]
    MalformedScript {
        /// The id the script declared (or the registration key it was loaded under).
        script_id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A playback operation was invoked before any script was loaded.
    #[error("no narration session is loaded")]
    SessionNotLoaded,

    /// A seek targeted a position that does not exist in the loaded script.
    #[error("position out of range: {what} index {index} (valid: 0..{len})")]
    PositionOutOfRange {
        /// Which coordinate was out of range (`section` or `line`).
        what: &'static str,
        /// The requested index.
        index: usize,
        /// The number of valid entries.
        len: usize,
    },

    /// A course is not fully wired through the registration contract.
    #[error("registration defect for course '{course_id}': {reason}")]
    RegistrationDefect {
        /// The offending course.
        course_id: String,
        /// Which part of the contract is missing.
        reason: String,
    },

    /// A course identifier is not valid hyphen-case.
    #[error("invalid course id: {0:?}")]
    InvalidCourseId(String),

    /// No live session has the given id.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// No script is known for the requested course.
    #[error("course not found: {0}")]
    CourseNotFound(String),

    /// An infrastructure (I/O, parsing) error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a `MalformedScript` error.
    pub fn malformed(script_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedScript {
            script_id: script_id.into(),
            reason: reason.into(),
        }
    }
}
