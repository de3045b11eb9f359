//! Integration tests for the course catalog routes.

mod common;

use axum::http::StatusCode;
use mathviz_test_support::ScriptBuilder;

#[tokio::test]
async fn test_list_courses_returns_outlines_sorted_by_id() {
    // Arrange
    let app = common::build_test_app();

    // Act
    let (status, json) = common::get_json(app, "/api/v1/courses").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let courses = json.as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["course_id"], "demo");
    assert_eq!(courses[0]["version_hash"], "memory-demo");
    assert_eq!(courses[0]["outline"]["total_lines"], 3);
    assert_eq!(courses[0]["outline"]["sections"][0]["line_count"], 2);
    assert_eq!(courses[1]["course_id"], "fractions");
}

#[tokio::test]
async fn test_list_courses_leaves_out_broken_scripts() {
    // Arrange
    let empty = ScriptBuilder::new("broken").build();
    let app = common::build_test_app_with(vec![common::fractions_script(), empty]);

    // Act
    let (status, json) = common::get_json(app, "/api/v1/courses").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["course_id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(ids, vec!["fractions"]);
}

#[tokio::test]
async fn test_get_course_returns_script() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/courses/fractions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["script"]["id"], "fractions");
    assert_eq!(json["script"]["sections"][1]["lines"][0]["id"], "c1");
}

#[tokio::test]
async fn test_get_unknown_course_returns_404() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/courses/geometry").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "course_not_found");
}

#[tokio::test]
async fn test_get_course_with_invalid_id_returns_400() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/courses/Fractions").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_course_id");
}

#[tokio::test]
async fn test_scene_preview_uses_course_renderer() {
    let app = common::build_test_app();

    let (status, json) =
        common::get_json(app, "/api/v1/courses/fractions/scenes/compare").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["renderer"], "Fractions");
    assert_eq!(json["binding"]["via"], "custom");
    assert_eq!(json["draw"]["section_id"], "compare");
    assert_eq!(json["draw"]["layers"][0]["id"], "main");
}

#[tokio::test]
async fn test_scene_preview_for_default_course_uses_default_unit() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/courses/demo/scenes/a").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["renderer"], "default");
    assert_eq!(json["binding"]["via"], "default");
}

#[tokio::test]
async fn test_scene_preview_for_unregistered_course_is_placeholder() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/courses/geometry/scenes/intro").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["renderer"], "placeholder");
    assert_eq!(json["binding"]["via"], "placeholder");
    assert_eq!(json["binding"]["reason"], "missing_scene_config");
}
