//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mathviz_core::course::CourseId;
use mathviz_narration::domain::script::NarrationScript;
use mathviz_scenes::application::registry::SceneRegistry;
use mathviz_scenes::domain::manifest::RegistryManifest;
use mathviz_scenes::domain::renderer::TemplateRenderer;
use mathviz_test_support::{
    FixedClock, InMemoryScriptRepository, ScriptBuilder, demo_script, renderer_spec,
    scene_config_for,
};
use tower::ServiceExt;

use mathviz_api::state::AppState;

/// Long-poll cap used by every test app.
pub const WAIT_TIMEOUT: Duration = Duration::from_millis(200);

/// Idle time after which test sessions are evicted.
pub const IDLE_TTL: Duration = Duration::from_secs(60);

/// The `fractions` course: two manual sections.
pub fn fractions_script() -> NarrationScript {
    ScriptBuilder::new("fractions")
        .section("intro", &["i1", "i2"])
        .section("compare", &["c1"])
        .build()
}

/// A registry with `fractions` fully registered and `demo` on the default unit.
pub fn scene_registry() -> SceneRegistry {
    let fractions = CourseId::parse("fractions").unwrap();
    let demo = CourseId::parse("demo").unwrap();
    let mut manifest = RegistryManifest::default();
    manifest.default_renderer.insert(demo);

    SceneRegistry::builder()
        .manifest(&manifest)
        .scene_config(fractions.clone(), scene_config_for(&fractions_script()))
        .renderer(
            fractions.clone(),
            Arc::new(TemplateRenderer::new(renderer_spec("Fractions"))),
        )
        .custom_course(fractions)
        .build()
}

/// Application state over in-memory scripts and a fixed clock.
pub fn build_test_state_with(scripts: Vec<NarrationScript>) -> AppState {
    AppState::new(
        FixedClock::lesson_start().shared(),
        Arc::new(InMemoryScriptRepository::with_scripts(scripts)),
        Arc::new(scene_registry()),
        WAIT_TIMEOUT,
        IDLE_TTL,
    )
}

/// Build the full app router over in-memory scripts and a fixed clock. Uses
/// the same route structure as `main.rs`.
pub fn build_test_app_with(scripts: Vec<NarrationScript>) -> Router {
    mathviz_api::app(build_test_state_with(scripts))
}

/// Build the full app router with the `demo` and `fractions` courses.
pub fn build_test_app() -> Router {
    build_test_app_with(vec![demo_script(), fractions_script()])
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Create a session on `course_id` and return its id.
pub async fn create_session(app: &Router, course_id: &str) -> String {
    let (status, json) = post_json(
        app.clone(),
        "/api/v1/sessions",
        &serde_json::json!({ "course_id": course_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["session_id"].as_str().unwrap().to_owned()
}

/// Send one playback command to a session.
pub async fn command(
    app: &Router,
    session_id: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app.clone(),
        &format!("/api/v1/sessions/{session_id}/commands"),
        &body,
    )
    .await
}
