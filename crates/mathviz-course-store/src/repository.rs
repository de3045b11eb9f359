//! Filesystem-backed script repository.

use std::sync::Arc;

use async_trait::async_trait;
use mathviz_core::course::CourseId;
use mathviz_core::error::DomainError;
use mathviz_narration::domain::repository::{ScriptRepository, StoredScript};
use mathviz_narration::domain::script::NarrationScript;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::layout::{CourseLayout, format_of};

/// Hex SHA-256 of a script's source bytes.
#[must_use]
pub fn version_hash(source: &[u8]) -> String {
    format!("{:x}", Sha256::digest(source))
}

/// Reads scripts from `<root>/scripts`.
#[derive(Debug, Clone)]
pub struct FileScriptRepository {
    layout: CourseLayout,
}

impl FileScriptRepository {
    /// Creates a repository over a course root.
    #[must_use]
    pub fn new(layout: CourseLayout) -> Self {
        Self { layout }
    }

    /// The course root layout.
    #[must_use]
    pub fn layout(&self) -> &CourseLayout {
        &self.layout
    }
}

#[async_trait]
impl ScriptRepository for FileScriptRepository {
    async fn list_course_ids(&self) -> Result<Vec<CourseId>, DomainError> {
        let mut ids = Vec::new();
        for file in self.layout.script_files().await? {
            match CourseId::parse(&file.stem) {
                Ok(id) => ids.push(id),
                Err(err) => warn!(path = %file.path.display(), error = %err, "skipping script"),
            }
        }
        ids.dedup();
        Ok(ids)
    }

    async fn load_script(&self, course_id: &CourseId) -> Result<StoredScript, DomainError> {
        let path = self
            .layout
            .find_script(course_id)
            .await
            .ok_or_else(|| DomainError::CourseNotFound(course_id.to_string()))?;
        let format = format_of(&path).ok_or_else(|| {
            DomainError::Infrastructure(format!("unknown script format: {}", path.display()))
        })?;

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            DomainError::Infrastructure(format!("cannot read {}: {e}", path.display()))
        })?;
        let source = std::str::from_utf8(&bytes)
            .map_err(|e| DomainError::malformed(course_id.as_str(), format!("not UTF-8: {e}")))?;

        let script = NarrationScript::parse(source, format, course_id.as_str())?;
        script.validate_for(course_id.as_str())?;
        debug!(course_id = %course_id, path = %path.display(), "script loaded");

        Ok(StoredScript {
            course_id: course_id.clone(),
            script: Arc::new(script),
            version_hash: version_hash(&bytes),
        })
    }
}
