//! Temporary course roots on disk.

use std::fs;
use std::path::{Path, PathBuf};

use mathviz_core::course::{CourseId, RENDERER_SUFFIX, SCENE_CONFIG_SUFFIX};
use mathviz_course_store::layout::{
    CourseLayout, REGISTRY_FILE, RENDERER_ENTRY_FILE, RENDERERS_DIR, SCENES_DIR, SCRIPTS_DIR,
};
use mathviz_narration::domain::script::NarrationScript;
use mathviz_scenes::domain::config::{SceneConfig, SceneKind, SectionScene};
use mathviz_scenes::domain::manifest::RegistryManifest;
use mathviz_scenes::domain::renderer::{LayerSpec, RendererSpec};
use tempfile::TempDir;

/// A course root in a temporary directory, removed on drop.
///
/// All writers panic on I/O failure.
#[derive(Debug)]
pub struct CourseFixture {
    dir: TempDir,
}

impl CourseFixture {
    /// Creates an empty course root with an empty script directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp course root");
        fs::create_dir_all(dir.path().join(SCRIPTS_DIR)).expect("create scripts dir");
        Self { dir }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// A layout over the root.
    #[must_use]
    pub fn layout(&self) -> CourseLayout {
        CourseLayout::new(self.root())
    }

    /// Writes a file relative to the root, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Removes a file relative to the root.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be removed.
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).expect("remove fixture file");
    }

    /// Writes `scripts/<id>.json`.
    ///
    /// # Panics
    ///
    /// Panics on I/O or serialization failure.
    pub fn write_script(&self, script: &NarrationScript) -> PathBuf {
        let json = serde_json::to_string_pretty(script).expect("serialize script");
        self.write(&format!("{SCRIPTS_DIR}/{}.json", script.id), &json)
    }

    /// Writes `scenes/<stem>.yaml`.
    ///
    /// # Panics
    ///
    /// Panics on I/O or serialization failure.
    pub fn write_scene_config(&self, stem: &str, config: &SceneConfig) -> PathBuf {
        let yaml = serde_yaml::to_string(config).expect("serialize scene config");
        self.write(&format!("{SCENES_DIR}/{stem}.yaml"), &yaml)
    }

    /// Writes `renderers/<Name>SceneRenderer.yaml`.
    ///
    /// # Panics
    ///
    /// Panics on I/O or serialization failure.
    pub fn write_renderer_file(&self, spec: &RendererSpec) -> PathBuf {
        let yaml = serde_yaml::to_string(spec).expect("serialize renderer");
        self.write(
            &format!("{RENDERERS_DIR}/{}{RENDERER_SUFFIX}.yaml", spec.name),
            &yaml,
        )
    }

    /// Writes `renderers/<Name>/renderer.yaml`.
    ///
    /// # Panics
    ///
    /// Panics on I/O or serialization failure.
    pub fn write_renderer_dir(&self, spec: &RendererSpec) -> PathBuf {
        let yaml = serde_yaml::to_string(spec).expect("serialize renderer");
        self.write(
            &format!("{RENDERERS_DIR}/{}/{RENDERER_ENTRY_FILE}", spec.name),
            &yaml,
        )
    }

    /// Writes `registry.yaml`.
    ///
    /// # Panics
    ///
    /// Panics on I/O or serialization failure.
    pub fn write_manifest(&self, manifest: &RegistryManifest) -> PathBuf {
        let yaml = serde_yaml::to_string(manifest).expect("serialize manifest");
        self.write(REGISTRY_FILE, &yaml)
    }

    /// Writes every artifact of a fully registered custom-rendered course and
    /// adds it to the factory, presenter and custom-renderer tables.
    ///
    /// The scene config binds every section under the camel-case stem and the
    /// renderer uses the file form under the Pascal-case name.
    ///
    /// # Panics
    ///
    /// Panics if the script id is not a course id, or on I/O failure.
    pub fn register_complete_course(
        &self,
        script: &NarrationScript,
        manifest: &mut RegistryManifest,
    ) -> CourseId {
        let course_id = CourseId::parse(&script.id).expect("script id must be a course id");
        self.write_script(script);
        self.write_scene_config(
            &format!("{}{SCENE_CONFIG_SUFFIX}", course_id.camel_name()),
            &scene_config_for(script),
        );
        self.write_renderer_file(&renderer_spec(&course_id.pascal_name()));

        manifest.factory.insert(course_id.clone());
        manifest.presenter.insert(course_id.clone());
        manifest.custom_renderer.insert(course_id.clone());
        course_id
    }
}

impl Default for CourseFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A scene config with one illustration entry per section of `script`.
#[must_use]
pub fn scene_config_for(script: &NarrationScript) -> SceneConfig {
    let mut config = SceneConfig::default();
    for section in &script.sections {
        config.sections.insert(
            section.id.clone(),
            SectionScene {
                kind: SceneKind::Illustration,
                ..SectionScene::default()
            },
        );
    }
    config
}

/// A one-layer renderer spec.
#[must_use]
pub fn renderer_spec(name: &str) -> RendererSpec {
    RendererSpec {
        name: name.to_owned(),
        layers: vec![LayerSpec {
            id: "main".to_owned(),
            primitive: "canvas".to_owned(),
            kinds: Vec::new(),
            sections: Vec::new(),
            bind: Vec::new(),
        }],
    }
}
