//! Integration tests for the filesystem script repository.

use mathviz_core::course::CourseId;
use mathviz_core::error::DomainError;
use mathviz_course_store::FileScriptRepository;
use mathviz_course_store::repository::version_hash;
use mathviz_narration::domain::repository::ScriptRepository;
use mathviz_test_support::{CourseFixture, ScriptBuilder, demo_script};

fn id(raw: &str) -> CourseId {
    CourseId::parse(raw).unwrap()
}

#[tokio::test]
async fn test_list_course_ids_reads_script_stems_sorted() {
    // Arrange
    let fixture = CourseFixture::new();
    fixture.write_script(&ScriptBuilder::new("fractions").section("a", &["a1"]).build());
    fixture.write_script(&demo_script());
    fixture.write("scripts/conic-sections.yaml", "id: conic-sections\n");
    fixture.write("scripts/README.md", "not a script");
    fixture.write("scripts/Bad_Name.json", "{}");
    let repo = FileScriptRepository::new(fixture.layout());

    // Act
    let ids = repo.list_course_ids().await.unwrap();

    // Assert
    assert_eq!(ids, vec![id("conic-sections"), id("demo"), id("fractions")]);
}

#[tokio::test]
async fn test_load_script_parses_validates_and_hashes() {
    // Arrange
    let fixture = CourseFixture::new();
    let path = fixture.write_script(&demo_script());
    let repo = FileScriptRepository::new(fixture.layout());

    // Act
    let stored = repo.load_script(&id("demo")).await.unwrap();

    // Assert
    assert_eq!(stored.course_id, id("demo"));
    assert_eq!(stored.script.total_lines(), 3);
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(stored.version_hash, version_hash(&bytes));
}

#[tokio::test]
async fn test_load_script_reads_yaml() {
    // Arrange
    let fixture = CourseFixture::new();
    fixture.write(
        "scripts/polar.yaml",
        "id: polar\ntitle: Polar\nsections:\n  - id: intro\n    type: intro\n    lines:\n      - id: l1\n        text: Hi\n",
    );
    let repo = FileScriptRepository::new(fixture.layout());

    // Act
    let stored = repo.load_script(&id("polar")).await.unwrap();

    // Assert
    assert_eq!(stored.script.sections[0].id, "intro");
}

#[tokio::test]
async fn test_load_script_rejects_id_mismatch() {
    // Arrange
    let fixture = CourseFixture::new();
    let script = ScriptBuilder::new("fractions").section("a", &["a1"]).build();
    let json = serde_json::to_string(&script).unwrap();
    fixture.write("scripts/decimals.json", &json);
    let repo = FileScriptRepository::new(fixture.layout());

    // Act
    let result = repo.load_script(&id("decimals")).await;

    // Assert
    match result {
        Err(DomainError::MalformedScript { script_id, reason }) => {
            assert_eq!(script_id, "decimals");
            assert!(reason.contains("does not match"));
        }
        other => panic!("expected MalformedScript, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_script_missing_course_is_not_found() {
    let fixture = CourseFixture::new();
    let repo = FileScriptRepository::new(fixture.layout());

    let result = repo.load_script(&id("nowhere")).await;

    assert!(matches!(result, Err(DomainError::CourseNotFound(ref c)) if c == "nowhere"));
}

#[tokio::test]
async fn test_load_script_with_broken_json_is_malformed() {
    let fixture = CourseFixture::new();
    fixture.write("scripts/broken.json", "{ \"id\": ");
    let repo = FileScriptRepository::new(fixture.layout());

    let result = repo.load_script(&id("broken")).await;

    assert!(matches!(result, Err(DomainError::MalformedScript { .. })));
}
