//! MathViz — HTTP API over narration sessions, the course catalog and scene
//! resolution.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

/// Builds the full router. `main` adds the tracing and CORS layers.
#[must_use]
pub fn app(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/courses", routes::courses::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .with_state(state)
}
