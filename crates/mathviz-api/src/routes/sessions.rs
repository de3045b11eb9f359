//! Routes for narration sessions.
//!
//! Every UI surface (inline control bar, presenter overlay) drives and
//! observes a session through these endpoints. Mutations return the snapshot
//! published by the transition; `watch` long-polls for the next one.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use mathviz_core::course::CourseId;
use mathviz_core::error::DomainError;
use mathviz_narration::application::session::NarrationSession;
use mathviz_narration::application::views::PlaybackSnapshot;
use mathviz_narration::domain::commands::{PlaybackCommand, PlaybackRequest};
use mathviz_scenes::application::registry::{BindingKind, SceneBinding};
use mathviz_scenes::domain::config::{SceneParameters, SceneState};
use mathviz_scenes::domain::renderer::DrawInstruction;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store;

/// Request body for POST / and POST /{session_id}/load.
#[derive(Debug, Deserialize)]
pub struct LoadCourseRequest {
    /// The course to load.
    pub course_id: String,
}

/// Query for GET /{session_id}/watch.
#[derive(Debug, Deserialize)]
pub struct WatchQuery {
    /// The last snapshot revision the caller has seen.
    pub revision: u64,
    /// How long to wait, capped by the server setting.
    pub timeout_ms: Option<u64>,
}

/// Request body for POST /{session_id}/scene.
#[derive(Debug, Default, Deserialize)]
pub struct SceneRequest {
    /// Learner-adjusted parameters.
    #[serde(default)]
    pub params: SceneParameters,
}

/// A resolved scene, ready for a drawing surface.
#[derive(Debug, Serialize)]
pub struct SceneResponse {
    /// Name of the rendering unit.
    pub renderer: String,
    /// How the binding was resolved.
    pub binding: BindingKind,
    /// The derived visual state.
    pub state: SceneState,
    /// The unit's output for that state.
    pub draw: DrawInstruction,
}

impl From<&SceneBinding> for SceneResponse {
    fn from(binding: &SceneBinding) -> Self {
        Self {
            renderer: binding.renderer.name().to_owned(),
            binding: binding.kind,
            state: binding.state.clone(),
            draw: binding.draw(),
        }
    }
}

async fn load_into(
    state: &AppState,
    session: &NarrationSession,
    course_id: &str,
) -> Result<PlaybackSnapshot, ApiError> {
    let course_id = CourseId::parse(course_id)?;
    let stored = state.scripts.load_script(&course_id).await?;
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, course_id = %course_id, version_hash = %stored.version_hash, "loading course");
    Ok(session
        .load(&course_id, stored.script, correlation_id)
        .await?)
}

/// POST /
///
/// Creates a session and loads the course into it. Nothing is registered if
/// the load fails.
#[instrument(skip(state, request), fields(course_id = %request.course_id))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<LoadCourseRequest>,
) -> Result<(StatusCode, Json<PlaybackSnapshot>), ApiError> {
    let session = NarrationSession::new(Uuid::new_v4(), state.clock.clone());
    let snapshot = load_into(&state, &session, &request.course_id).await?;
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /{session_id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    Ok(Json(state.session(session_id).await?.snapshot()))
}

/// POST /{session_id}/load
#[instrument(skip(state, request), fields(course_id = %request.course_id))]
async fn load_course(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<LoadCourseRequest>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let session = state.session(session_id).await?;
    Ok(Json(load_into(&state, &session, &request.course_id).await?))
}

/// POST /{session_id}/commands
#[instrument(skip(state))]
async fn execute_command(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(command): Json<PlaybackCommand>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let session = state.session(session_id).await?;
    let request = PlaybackRequest::new(command);
    info!(correlation_id = %request.correlation_id, "handling {} command", command.command_type());
    Ok(Json(session.execute(request).await?))
}

/// POST /{session_id}/narration-finished
#[instrument(skip(state))]
async fn narration_finished(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let session = state.session(session_id).await?;
    Ok(Json(session.narration_finished().await?))
}

/// GET /{session_id}/watch?revision=N
///
/// Returns as soon as a snapshot newer than `revision` exists, or the current
/// snapshot once the wait times out.
async fn watch_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<WatchQuery>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let session = state.session(session_id).await?;
    let timeout = query
        .timeout_ms
        .map_or(state.wait_timeout, Duration::from_millis)
        .min(state.wait_timeout);
    Ok(Json(session.wait_for_change(query.revision, timeout).await))
}

/// POST /{session_id}/scene
///
/// Resolves the scene for the section on screen.
#[instrument(skip(state, request))]
async fn resolve_scene(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SceneRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let snapshot = state.session(session_id).await?.snapshot();
    let (Some(script_id), Some(section_id)) = (snapshot.script_id.as_deref(), snapshot.section_id())
    else {
        return Err(DomainError::SessionNotLoaded.into());
    };
    let course_id = CourseId::parse(script_id)?;
    let binding = state.scenes.resolve(&course_id, section_id, &request.params);
    Ok(Json(SceneResponse::from(&binding)))
}

/// DELETE /{session_id}
///
/// Closes the session, cancelling any pending timer, and forgets it.
#[instrument(skip(state))]
async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .sessions
        .remove(session_id)
        .await
        .ok_or(DomainError::SessionNotFound(session_id))?;
    store::close(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for narration sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session).delete(close_session))
        .route("/{session_id}/load", post(load_course))
        .route("/{session_id}/commands", post(execute_command))
        .route("/{session_id}/narration-finished", post(narration_finished))
        .route("/{session_id}/watch", get(watch_session))
        .route("/{session_id}/scene", post(resolve_scene))
}
