//! Script repository abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use mathviz_core::course::CourseId;
use mathviz_core::error::DomainError;

use super::script::NarrationScript;

/// A validated script as stored in the course catalog.
#[derive(Debug, Clone)]
pub struct StoredScript {
    /// The registration key the script was found under.
    pub course_id: CourseId,
    /// The parsed script.
    pub script: Arc<NarrationScript>,
    /// Hex SHA-256 of the source bytes.
    pub version_hash: String,
}

/// Repository trait for discovering and loading course scripts.
#[async_trait]
pub trait ScriptRepository: Send + Sync {
    /// Lists every course id with a script, sorted.
    async fn list_course_ids(&self) -> Result<Vec<CourseId>, DomainError>;

    /// Loads and validates the script registered under `course_id`.
    ///
    /// Returns `DomainError::CourseNotFound` when no script exists and
    /// `DomainError::MalformedScript` when it fails to parse or validate.
    async fn load_script(&self, course_id: &CourseId) -> Result<StoredScript, DomainError>;
}
