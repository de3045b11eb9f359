//! Script repository doubles.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mathviz_core::course::CourseId;
use mathviz_core::error::DomainError;
use mathviz_narration::domain::repository::{ScriptRepository, StoredScript};
use mathviz_narration::domain::script::NarrationScript;

/// A repository holding scripts in memory, keyed by their own id.
///
/// Scripts are stored as given; `load_script` validates them the way the
/// filesystem repository does, so a malformed script surfaces as
/// `MalformedScript` on load.
#[derive(Debug, Default)]
pub struct InMemoryScriptRepository {
    scripts: BTreeMap<CourseId, Arc<NarrationScript>>,
}

impl InMemoryScriptRepository {
    /// Creates a repository from scripts.
    ///
    /// # Panics
    ///
    /// Panics if a script id is not a valid course id.
    #[must_use]
    pub fn with_scripts(scripts: impl IntoIterator<Item = NarrationScript>) -> Self {
        let scripts = scripts
            .into_iter()
            .map(|script| {
                let id = CourseId::parse(&script.id).expect("script id must be a course id");
                (id, Arc::new(script))
            })
            .collect();
        Self { scripts }
    }
}

#[async_trait]
impl ScriptRepository for InMemoryScriptRepository {
    async fn list_course_ids(&self) -> Result<Vec<CourseId>, DomainError> {
        Ok(self.scripts.keys().cloned().collect())
    }

    async fn load_script(&self, course_id: &CourseId) -> Result<StoredScript, DomainError> {
        let script = self
            .scripts
            .get(course_id)
            .ok_or_else(|| DomainError::CourseNotFound(course_id.to_string()))?;
        script.validate_for(course_id.as_str())?;
        Ok(StoredScript {
            course_id: course_id.clone(),
            script: Arc::clone(script),
            version_hash: format!("memory-{course_id}"),
        })
    }
}

/// A repository that records every `load_script` call and delegates to an
/// in-memory repository.
#[derive(Debug, Default)]
pub struct RecordingScriptRepository {
    inner: InMemoryScriptRepository,
    loads: Mutex<Vec<CourseId>>,
}

impl RecordingScriptRepository {
    /// Wraps an in-memory repository.
    #[must_use]
    pub fn new(inner: InMemoryScriptRepository) -> Self {
        Self {
            inner,
            loads: Mutex::new(Vec::new()),
        }
    }

    /// Course ids passed to `load_script`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn loaded_course_ids(&self) -> Vec<CourseId> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRepository for RecordingScriptRepository {
    async fn list_course_ids(&self) -> Result<Vec<CourseId>, DomainError> {
        self.inner.list_course_ids().await
    }

    async fn load_script(&self, course_id: &CourseId) -> Result<StoredScript, DomainError> {
        self.loads.lock().unwrap().push(course_id.clone());
        self.inner.load_script(course_id).await
    }
}

/// A repository that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingScriptRepository;

#[async_trait]
impl ScriptRepository for FailingScriptRepository {
    async fn list_course_ids(&self) -> Result<Vec<CourseId>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn load_script(&self, _course_id: &CourseId) -> Result<StoredScript, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
