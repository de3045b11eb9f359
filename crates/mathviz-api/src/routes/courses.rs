//! Routes for the course catalog and scene previews.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use mathviz_core::course::CourseId;
use mathviz_narration::application::views::ScriptOutline;
use mathviz_narration::domain::script::NarrationScript;
use mathviz_scenes::domain::config::SceneParameters;
use serde::Serialize;
use tracing::{instrument, warn};

use super::sessions::SceneResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// One catalog entry.
#[derive(Debug, Serialize)]
pub struct CourseSummary {
    /// The course id.
    pub course_id: CourseId,
    /// Hash of the script source.
    pub version_hash: String,
    /// Section and line counts.
    pub outline: ScriptOutline,
}

/// A full script with its catalog metadata.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    /// The course id.
    pub course_id: CourseId,
    /// Hash of the script source.
    pub version_hash: String,
    /// The script as authored.
    pub script: NarrationScript,
}

/// GET /
///
/// Courses whose script fails to load are logged and left out.
#[instrument(skip(state))]
async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    let mut courses = Vec::new();
    for course_id in state.scripts.list_course_ids().await? {
        match state.scripts.load_script(&course_id).await {
            Ok(stored) => courses.push(CourseSummary {
                outline: ScriptOutline::from(stored.script.as_ref()),
                course_id: stored.course_id,
                version_hash: stored.version_hash,
            }),
            Err(err) => warn!(course_id = %course_id, error = %err, "course left out of catalog"),
        }
    }
    Ok(Json(courses))
}

/// GET /{course_id}
#[instrument(skip(state))]
async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseDetail>, ApiError> {
    let course_id = CourseId::parse(&course_id)?;
    let stored = state.scripts.load_script(&course_id).await?;
    Ok(Json(CourseDetail {
        course_id: stored.course_id,
        version_hash: stored.version_hash,
        script: stored.script.as_ref().clone(),
    }))
}

/// GET /{course_id}/scenes/{section_id}
///
/// Resolves a section with no learner parameters.
#[instrument(skip(state))]
async fn preview_scene(
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(String, String)>,
) -> Result<Json<SceneResponse>, ApiError> {
    let course_id = CourseId::parse(&course_id)?;
    let binding = state
        .scenes
        .resolve(&course_id, &section_id, &SceneParameters::new());
    Ok(Json(SceneResponse::from(&binding)))
}

/// Returns the router for the course catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/{course_id}", get(get_course))
        .route("/{course_id}/scenes/{section_id}", get(preview_scene))
}
