//! On-disk layout of a course root and the candidate-path lookup order.
//!
//! ```text
//! <root>/
//!   registry.yaml
//!   scripts/<course-id>.{json,yaml,yml}
//!   scenes/<stem>.{yaml,yml,json}            stem from CourseId::scene_config_stems
//!   renderers/<Name>/renderer.yaml           directory form
//!   renderers/<Name>SceneRenderer.{yaml,yml,json}   file form
//! ```

use std::path::{Path, PathBuf};

use mathviz_core::course::{CourseId, RENDERER_SUFFIX};
use mathviz_core::error::DomainError;
use mathviz_narration::domain::script::ScriptFormat;

/// Script directory name.
pub const SCRIPTS_DIR: &str = "scripts";
/// Scene-config directory name.
pub const SCENES_DIR: &str = "scenes";
/// Renderer directory name.
pub const RENDERERS_DIR: &str = "renderers";
/// Registry manifest file name.
pub const REGISTRY_FILE: &str = "registry.yaml";
/// Entry file inside a directory-form renderer.
pub const RENDERER_ENTRY_FILE: &str = "renderer.yaml";

const SCRIPT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];
const CONFIG_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// A script file found in the script directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    /// File stem, which should be a course id.
    pub stem: String,
    /// Full path.
    pub path: PathBuf,
    /// Encoding by extension.
    pub format: ScriptFormat,
}

/// How a renderer is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererForm {
    /// `renderers/<Name>/renderer.yaml`.
    Directory,
    /// `renderers/<Name>SceneRenderer.<ext>`.
    File,
}

/// One place a course's renderer may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCandidate {
    /// The derived renderer name.
    pub name: String,
    /// Directory or file form.
    pub form: RendererForm,
    /// Path to the spec file.
    pub path: PathBuf,
}

/// A course root.
#[derive(Debug, Clone)]
pub struct CourseLayout {
    root: PathBuf,
}

impl CourseLayout {
    /// Wraps a course root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/scripts`.
    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(SCRIPTS_DIR)
    }

    /// `<root>/scenes`.
    #[must_use]
    pub fn scenes_dir(&self) -> PathBuf {
        self.root.join(SCENES_DIR)
    }

    /// `<root>/renderers`.
    #[must_use]
    pub fn renderers_dir(&self) -> PathBuf {
        self.root.join(RENDERERS_DIR)
    }

    /// `<root>/registry.yaml`.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Script paths for a course, in lookup order.
    #[must_use]
    pub fn script_candidates(&self, course_id: &CourseId) -> Vec<PathBuf> {
        let dir = self.scripts_dir();
        SCRIPT_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{course_id}.{ext}")))
            .collect()
    }

    /// Scene-config paths for a course, in lookup order: every derived stem,
    /// each with every extension.
    #[must_use]
    pub fn scene_config_candidates(&self, course_id: &CourseId) -> Vec<PathBuf> {
        let dir = self.scenes_dir();
        course_id
            .scene_config_stems()
            .iter()
            .flat_map(|stem| {
                CONFIG_EXTENSIONS
                    .iter()
                    .map(|ext| dir.join(format!("{stem}.{ext}")))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Renderer locations for a course, in lookup order: the directory form
    /// of every derived name, then the file form of every derived name.
    #[must_use]
    pub fn renderer_candidates(&self, course_id: &CourseId) -> Vec<RendererCandidate> {
        let dir = self.renderers_dir();
        let dir = dir.as_path();
        let names = course_id.renderer_names();

        let directories = names.iter().map(|name| RendererCandidate {
            name: name.clone(),
            form: RendererForm::Directory,
            path: dir.join(name).join(RENDERER_ENTRY_FILE),
        });
        let files = names.iter().flat_map(|name| {
            CONFIG_EXTENSIONS.iter().map(move |ext| RendererCandidate {
                name: name.clone(),
                form: RendererForm::File,
                path: dir.join(format!("{name}{RENDERER_SUFFIX}.{ext}")),
            })
        });
        directories.chain(files).collect()
    }

    /// The first existing script file for a course.
    pub async fn find_script(&self, course_id: &CourseId) -> Option<PathBuf> {
        first_file(self.script_candidates(course_id)).await
    }

    /// The first existing scene config for a course.
    pub async fn find_scene_config(&self, course_id: &CourseId) -> Option<PathBuf> {
        first_file(self.scene_config_candidates(course_id)).await
    }

    /// The first existing renderer for a course.
    pub async fn find_renderer(&self, course_id: &CourseId) -> Option<RendererCandidate> {
        for candidate in self.renderer_candidates(course_id) {
            if is_file(&candidate.path).await {
                return Some(candidate);
            }
        }
        None
    }

    /// Every script file in the script directory, sorted by stem then path.
    /// Files with other extensions are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the directory cannot be read.
    pub async fn script_files(&self) -> Result<Vec<ScriptFile>, DomainError> {
        let dir = self.scripts_dir();
        let unreadable =
            |e: std::io::Error| DomainError::Infrastructure(format!("cannot read {}: {e}", dir.display()));
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(unreadable)?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
            let path = entry.path();
            if !is_file(&path).await {
                continue;
            }
            let format = format_of(&path);
            let stem = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned);
            if let (Some(format), Some(stem)) = (format, stem) {
                files.push(ScriptFile { stem, path, format });
            }
        }
        files.sort_by(|a, b| a.stem.cmp(&b.stem).then_with(|| a.path.cmp(&b.path)));
        Ok(files)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

async fn first_file(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    for path in candidates {
        if is_file(&path).await {
            return Some(path);
        }
    }
    None
}

/// The script format implied by a path's extension.
#[must_use]
pub fn format_of(path: &Path) -> Option<ScriptFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ScriptFormat::from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> CourseLayout {
        CourseLayout::new("/courses")
    }

    fn id(raw: &str) -> CourseId {
        CourseId::parse(raw).unwrap()
    }

    #[test]
    fn test_scene_config_candidates_follow_stem_order() {
        let candidates = layout().scene_config_candidates(&id("conic-sections"));

        let names: Vec<_> = candidates
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "conic-sectionsScenes.yaml",
                "conic-sectionsScenes.yml",
                "conic-sectionsScenes.json",
                "conicSectionsScenes.yaml",
                "conicSectionsScenes.yml",
                "conicSectionsScenes.json",
                "conicScenes.yaml",
                "conicScenes.yml",
                "conicScenes.json",
            ]
        );
        assert!(candidates.iter().all(|p| p.starts_with("/courses/scenes")));
    }

    #[test]
    fn test_renderer_candidates_try_directories_before_files() {
        let candidates = layout().renderer_candidates(&id("quadratic-function"));

        let summary: Vec<_> = candidates
            .iter()
            .map(|c| (c.name.as_str(), c.form))
            .collect();
        assert_eq!(summary[0], ("QuadraticFunction", RendererForm::Directory));
        assert_eq!(summary[1], ("Quadratic", RendererForm::Directory));
        assert_eq!(summary[2], ("QuadraticFunction", RendererForm::File));
        assert_eq!(summary.last(), Some(&("Quadratic", RendererForm::File)));
        assert_eq!(
            candidates[1].path,
            PathBuf::from("/courses/renderers/Quadratic/renderer.yaml")
        );
        assert_eq!(
            candidates[2].path,
            PathBuf::from("/courses/renderers/QuadraticFunctionSceneRenderer.yaml")
        );
    }

    #[test]
    fn test_script_candidates_prefer_json() {
        let candidates = layout().script_candidates(&id("fractions"));

        assert_eq!(candidates[0], PathBuf::from("/courses/scripts/fractions.json"));
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_format_of_maps_extensions() {
        assert_eq!(format_of(Path::new("a.json")), Some(ScriptFormat::Json));
        assert_eq!(format_of(Path::new("a.yml")), Some(ScriptFormat::Yaml));
        assert_eq!(format_of(Path::new("a.txt")), None);
    }

    #[tokio::test]
    async fn test_lookups_return_first_existing_candidate() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let layout = CourseLayout::new(dir.path());
        for rel in [
            "scripts/fractions.yaml",
            "scenes/conicScenes.yaml",
            "renderers/ConicSceneRenderer.yaml",
            "renderers/Conic/renderer.yaml",
        ] {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "x").unwrap();
        }
        std::fs::create_dir_all(dir.path().join("scripts/fractions.json")).unwrap();

        // Act
        let script = layout.find_script(&id("fractions")).await;
        let scenes = layout.find_scene_config(&id("conic-sections")).await;
        let renderer = layout.find_renderer(&id("conic-sections")).await.unwrap();
        let missing = layout.find_scene_config(&id("fractions")).await;

        // Assert
        assert_eq!(script, Some(dir.path().join("scripts/fractions.yaml")));
        assert_eq!(scenes, Some(dir.path().join("scenes/conicScenes.yaml")));
        assert_eq!(renderer.form, RendererForm::Directory);
        assert_eq!(renderer.name, "Conic");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_script_files_skip_directories_and_unknown_extensions() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join(SCRIPTS_DIR);
        std::fs::create_dir_all(scripts.join("nested.json")).unwrap();
        std::fs::write(scripts.join("fractions.yaml"), "x").unwrap();
        std::fs::write(scripts.join("fractions.json"), "x").unwrap();
        std::fs::write(scripts.join("notes.txt"), "x").unwrap();

        // Act
        let files = CourseLayout::new(dir.path()).script_files().await.unwrap();

        // Assert
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["fractions.json", "fractions.yaml"]);
    }
}
