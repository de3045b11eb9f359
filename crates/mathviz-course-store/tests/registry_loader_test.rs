//! Integration tests for building the scene registry from a course root.

use mathviz_core::course::CourseId;
use mathviz_course_store::{
    CourseLayout, FileScriptRepository, load_manifest, load_scene_registry,
};
use mathviz_narration::domain::repository::ScriptRepository;
use mathviz_scenes::application::registry::{BindingKind, PlaceholderReason};
use mathviz_scenes::domain::config::SceneParameters;
use mathviz_scenes::domain::manifest::RegistryManifest;
use mathviz_test_support::{CourseFixture, ScriptBuilder, renderer_spec};

fn id(raw: &str) -> CourseId {
    CourseId::parse(raw).unwrap()
}

#[tokio::test]
async fn test_missing_manifest_is_empty() {
    let fixture = CourseFixture::new();

    let manifest = load_manifest(&fixture.layout()).await.unwrap();

    assert_eq!(manifest, RegistryManifest::default());
}

#[tokio::test]
async fn test_invalid_manifest_is_an_error() {
    let fixture = CourseFixture::new();
    fixture.write("registry.yaml", "presenter: [Not A Course]\n");

    let result = load_manifest(&fixture.layout()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_registry_resolves_complete_course_to_its_renderer() {
    // Arrange
    let fixture = CourseFixture::new();
    let mut manifest = RegistryManifest::default();
    let script = ScriptBuilder::new("fractions")
        .section("intro", &["i1"])
        .section("compare", &["c1"])
        .build();
    fixture.register_complete_course(&script, &mut manifest);
    fixture.write_manifest(&manifest);

    // Act
    let registry = load_scene_registry(&fixture.layout()).await.unwrap();
    let binding = registry.resolve(&id("fractions"), "compare", &SceneParameters::new());

    // Assert
    assert_eq!(binding.kind, BindingKind::Custom);
    assert_eq!(binding.renderer.name(), "Fractions");
}

#[tokio::test]
async fn test_registry_finds_contracted_directory_renderer() {
    // Arrange
    let fixture = CourseFixture::new();
    let mut manifest = RegistryManifest::default();
    let course = id("conic-sections");
    fixture.write("scenes/conicScenes.yaml", "sections:\n  intro:\n    kind: title\n");
    fixture.write_renderer_dir(&renderer_spec("Conic"));
    manifest.presenter.insert(course.clone());
    manifest.factory.insert(course.clone());
    manifest.custom_renderer.insert(course.clone());
    fixture.write_manifest(&manifest);

    // Act
    let registry = load_scene_registry(&fixture.layout()).await.unwrap();
    let binding = registry.resolve(&course, "intro", &SceneParameters::new());

    // Assert
    assert_eq!(binding.kind, BindingKind::Custom);
    assert_eq!(binding.renderer.name(), "Conic");
}

#[tokio::test]
async fn test_registered_course_without_files_degrades_to_placeholder() {
    // Arrange
    let fixture = CourseFixture::new();
    let mut manifest = RegistryManifest::default();
    manifest.presenter.insert(id("ghost"));
    manifest.factory.insert(id("ghost"));
    manifest.custom_renderer.insert(id("ghost"));
    fixture.write_manifest(&manifest);

    // Act
    let registry = load_scene_registry(&fixture.layout()).await.unwrap();
    let binding = registry.resolve(&id("ghost"), "intro", &SceneParameters::new());

    // Assert
    assert_eq!(
        binding.kind,
        BindingKind::Placeholder {
            reason: PlaceholderReason::MissingSceneConfig
        }
    );
}

#[tokio::test]
async fn test_unparseable_scene_config_fails_startup() {
    let fixture = CourseFixture::new();
    let mut manifest = RegistryManifest::default();
    manifest.presenter.insert(id("fractions"));
    fixture.write_manifest(&manifest);
    fixture.write("scenes/fractionsScenes.yaml", "sections: [not, a, map]\n");

    let result = load_scene_registry(&fixture.layout()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_shipped_catalog_resolves_every_section_without_placeholders() {
    // Arrange
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../courses");
    let layout = CourseLayout::new(root);
    let repository = FileScriptRepository::new(layout.clone());

    // Act
    let registry = load_scene_registry(&layout).await.unwrap();

    // Assert
    for course_id in repository.list_course_ids().await.unwrap() {
        let stored = repository.load_script(&course_id).await.unwrap();
        for section in &stored.script.sections {
            let binding = registry.resolve(&course_id, &section.id, &SceneParameters::new());
            assert!(
                !matches!(binding.kind, BindingKind::Placeholder { .. }),
                "{course_id}/{} resolved to a placeholder",
                section.id
            );
        }
    }
}
