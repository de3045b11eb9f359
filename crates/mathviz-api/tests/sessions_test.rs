//! Integration tests for narration session routes.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use mathviz_narration::domain::aggregates::PlaybackPhase;
use mathviz_narration::domain::script::Trigger;
use mathviz_test_support::ScriptBuilder;
use serde_json::json;

#[tokio::test]
async fn test_create_session_loads_course_at_origin() {
    // Arrange
    let app = common::build_test_app();

    // Act
    let (status, json) = common::post_json(
        app,
        "/api/v1/sessions",
        &json!({ "course_id": "demo" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["phase"], "loaded");
    assert_eq!(json["script_id"], "demo");
    assert_eq!(json["state"]["section_index"], 0);
    assert_eq!(json["state"]["line_index"], 0);
    assert_eq!(json["state"]["running"], false);
    assert_eq!(json["line"]["text"], "line a1");
    assert_eq!(json["line_number"], 1);
    assert_eq!(json["total_lines"], 3);
}

#[tokio::test]
async fn test_create_session_for_unknown_course_registers_nothing() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/sessions",
        &json!({ "course_id": "geometry" }),
    )
    .await;
    let (_, health) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "course_not_found");
    assert_eq!(health["sessions"], 0);
}

#[tokio::test]
async fn test_create_session_for_malformed_script_returns_422() {
    let broken = ScriptBuilder::new("broken").build();
    let app = common::build_test_app_with(vec![broken]);

    let (status, json) = common::post_json(
        app,
        "/api/v1/sessions",
        &json!({ "course_id": "broken" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "malformed_script");
}

#[tokio::test]
async fn test_demo_course_completes_after_two_advances() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;
    common::command(&app, &session_id, json!({ "command": "start" })).await;

    // Act
    let (_, first) = common::command(&app, &session_id, json!({ "command": "advance" })).await;
    let (_, second) = common::command(&app, &session_id, json!({ "command": "advance" })).await;
    let (status, third) =
        common::command(&app, &session_id, json!({ "command": "advance" })).await;

    // Assert
    assert_eq!(first["line"]["line_id"], "a2");
    assert_eq!(first["phase"], "playing");
    assert_eq!(second["line"]["line_id"], "b1");
    assert_eq!(second["phase"], "completed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(third["phase"], "completed");
    assert_eq!(third["line"]["line_id"], "b1");
    assert_eq!(third["version"], second["version"]);
}

#[tokio::test]
async fn test_get_session_returns_latest_snapshot() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;
    common::command(&app, &session_id, json!({ "command": "jump_to", "section": 1 })).await;

    // Act
    let (status, json) =
        common::get_json(app, &format!("/api/v1/sessions/{session_id}")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"]["section_index"], 1);
    assert_eq!(json["line"]["section_id"], "b");
}

#[tokio::test]
async fn test_unknown_session_returns_404() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(
        app,
        "/api/v1/sessions/00000000-0000-4000-8000-000000000000",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn test_jump_out_of_range_returns_400_and_keeps_position() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;

    // Act
    let (status, json) = common::command(
        &app,
        &session_id,
        json!({ "command": "jump_to_line", "section": 0, "line": 5 }),
    )
    .await;
    let (_, state) = common::get_json(app, &format!("/api/v1/sessions/{session_id}")).await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "position_out_of_range");
    assert_eq!(state["version"], 1);
    assert_eq!(state["state"]["line_index"], 0);
}

#[tokio::test]
async fn test_set_mode_keeps_position() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;
    common::command(&app, &session_id, json!({ "command": "advance" })).await;

    // Act
    let (status, json) = common::command(
        &app,
        &session_id,
        json!({ "command": "set_mode", "mode": "presenter" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"]["mode"], "presenter");
    assert_eq!(json["line"]["line_id"], "a2");
}

#[tokio::test]
async fn test_reload_switches_course() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;

    // Act
    let (status, json) = common::post_json(
        app,
        &format!("/api/v1/sessions/{session_id}/load"),
        &json!({ "course_id": "fractions" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["script_id"], "fractions");
    assert_eq!(json["line"]["line_id"], "i1");
}

#[tokio::test]
async fn test_scene_follows_current_section_and_learner_params() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "fractions").await;
    common::command(&app, &session_id, json!({ "command": "jump_to", "section": 1 })).await;

    // Act
    let (status, json) = common::post_json(
        app,
        &format!("/api/v1/sessions/{session_id}/scene"),
        &json!({ "params": { "numerator": 3, "denominator": 4 } }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["renderer"], "Fractions");
    assert_eq!(json["state"]["section_id"], "compare");
    assert_eq!(json["state"]["params"]["numerator"], 3);
    assert_eq!(json["draw"]["layers"][0]["params"]["denominator"], 4);
}

#[tokio::test]
async fn test_close_removes_session() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;
    let uri = format!("/api/v1/sessions/{session_id}");

    // Act
    let (status, _) = common::delete(app.clone(), &uri).await;
    let (after, _) = common::get_json(app, &uri).await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(after, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watch_returns_newer_snapshot_immediately() {
    // Arrange
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;
    common::command(&app, &session_id, json!({ "command": "advance" })).await;

    // Act
    let (status, json) = common::get_json(
        app,
        &format!("/api/v1/sessions/{session_id}/watch?revision=1"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["revision"], 2);
    assert_eq!(json["version"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_watch_times_out_with_current_snapshot() {
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;

    let (status, json) = common::get_json(
        app,
        &format!("/api/v1/sessions/{session_id}/watch?revision=1&timeout_ms=60000"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["revision"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_narration_finished_arms_timer_that_advances() {
    // Arrange
    let timed = ScriptBuilder::new("fractions")
        .timed_section("intro", Trigger::Auto { delay_ms: 100 }, &["i1", "i2"])
        .build();
    let app = common::build_test_app_with(vec![timed]);
    let session_id = common::create_session(&app, "fractions").await;
    let (_, started) = common::command(&app, &session_id, json!({ "command": "start" })).await;

    // Act
    let (status, armed) = common::post_json(
        app.clone(),
        &format!("/api/v1/sessions/{session_id}/narration-finished"),
        &json!({}),
    )
    .await;
    let revision = armed["revision"].as_u64().unwrap();
    let (_, advanced) = common::get_json(
        app,
        &format!("/api/v1/sessions/{session_id}/watch?revision={revision}"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(armed["timer_armed"], true);
    assert_eq!(armed["line"]["line_id"], "i1");
    assert_eq!(advanced["line"]["line_id"], "i2");
    assert!(advanced["version"].as_i64().unwrap() > started["version"].as_i64().unwrap());
}

#[tokio::test]
async fn test_narration_finished_on_manual_line_does_not_move() {
    let manual = ScriptBuilder::new("fractions")
        .timed_section("intro", Trigger::Manual, &["i1", "i2"])
        .build();
    let app = common::build_test_app_with(vec![manual]);
    let session_id = common::create_session(&app, "fractions").await;
    common::command(&app, &session_id, json!({ "command": "start" })).await;

    let (status, json) = common::post_json(
        app,
        &format!("/api/v1/sessions/{session_id}/narration-finished"),
        &json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["timer_armed"], false);
    assert_eq!(json["line"]["line_id"], "i1");
}

#[tokio::test]
async fn test_narration_finished_without_trigger_advances_at_once() {
    let app = common::build_test_app();
    let session_id = common::create_session(&app, "demo").await;
    common::command(&app, &session_id, json!({ "command": "start" })).await;

    let (status, json) = common::post_json(
        app,
        &format!("/api/v1/sessions/{session_id}/narration-finished"),
        &json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["timer_armed"], false);
    assert_eq!(json["line"]["line_id"], "a2");
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_is_evicted_and_its_timer_never_fires() {
    // Arrange
    let timed = ScriptBuilder::new("fractions")
        .timed_section("intro", Trigger::Auto { delay_ms: 120_000 }, &["i1", "i2"])
        .build();
    let state = common::build_test_state_with(vec![timed]);
    let app = mathviz_api::app(state.clone());
    let session_id = common::create_session(&app, "fractions").await;
    common::command(&app, &session_id, json!({ "command": "start" })).await;
    let (_, armed) = common::post_json(
        app.clone(),
        &format!("/api/v1/sessions/{session_id}/narration-finished"),
        &json!({}),
    )
    .await;
    let session = state
        .session(session_id.parse().unwrap())
        .await
        .unwrap();

    // Act
    tokio::time::advance(common::IDLE_TTL).await;
    let evicted = state.sessions.evict_idle().await;
    tokio::time::sleep(Duration::from_secs(180)).await;
    let (status, _) =
        common::get_json(app, &format!("/api/v1/sessions/{session_id}")).await;

    // Assert
    assert_eq!(armed["timer_armed"], true);
    assert_eq!(evicted.len(), 1);
    assert_eq!(status, StatusCode::NOT_FOUND);
    let closed = session.snapshot();
    assert_eq!(closed.phase, PlaybackPhase::Idle);
    assert!(!closed.timer_armed);
    assert!(closed.line.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_closes_abandoned_sessions() {
    // Arrange
    let state = common::build_test_state_with(vec![common::fractions_script()]);
    let app = mathviz_api::app(state.clone());
    common::create_session(&app, "fractions").await;
    common::create_session(&app, "fractions").await;
    let sweeper = state.sessions.spawn_sweeper(Duration::from_secs(10));

    // Act
    tokio::time::sleep(common::IDLE_TTL + Duration::from_secs(15)).await;
    let (_, health) = common::get_json(app, "/health").await;

    // Assert
    assert_eq!(health["sessions"], 0);
    sweeper.abort();
}
