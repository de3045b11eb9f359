//! MathViz API server entry point.

use std::sync::Arc;

use mathviz_api::config::ServerConfig;
use mathviz_api::error::AppError;
use mathviz_api::state::AppState;
use mathviz_core::event::SystemClock;
use mathviz_course_store::{CourseLayout, FileScriptRepository, load_scene_registry};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting MathViz API server");

    let config = ServerConfig::from_env()?;
    let layout = CourseLayout::new(config.course_root.clone());

    // Scene configs and renderers are loaded once; a malformed one stops startup.
    let scenes = load_scene_registry(&layout).await?;
    let scripts = FileScriptRepository::new(layout);

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(scripts),
        Arc::new(scenes),
        config.session_wait_timeout,
        config.session_idle_ttl,
    );

    // Closes sessions whose clients left without a DELETE.
    let _sweeper = app_state
        .sessions
        .spawn_sweeper(config.session_sweep_period());

    // TODO: Replace CorsLayer::permissive() with the presenter's origin once it is deployed separately.
    let app = mathviz_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!(course_root = %config.course_root.display(), "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
