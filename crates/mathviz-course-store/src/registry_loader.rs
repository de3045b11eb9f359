//! Builds the runtime [`SceneRegistry`] from a course root.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use mathviz_core::error::DomainError;
use mathviz_scenes::application::registry::SceneRegistry;
use mathviz_scenes::domain::config::SceneConfig;
use mathviz_scenes::domain::manifest::RegistryManifest;
use mathviz_scenes::domain::renderer::{RendererSpec, TemplateRenderer};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::layout::CourseLayout;

/// Reads `registry.yaml`. A missing manifest is an empty one.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file exists but cannot be
/// read or parsed.
pub async fn load_manifest(layout: &CourseLayout) -> Result<RegistryManifest, DomainError> {
    let path = layout.registry_path();
    match tokio::fs::read_to_string(&path).await {
        Ok(source) => RegistryManifest::from_yaml(&source).map_err(|e| {
            DomainError::Infrastructure(format!("invalid manifest {}: {e}", path.display()))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "no registry manifest; every table is empty");
            Ok(RegistryManifest::default())
        }
        Err(e) => Err(DomainError::Infrastructure(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

/// Reads a scene config (YAML or JSON by extension).
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` on I/O or parse failure.
pub async fn read_scene_config(path: &Path) -> Result<SceneConfig, DomainError> {
    read_document(path).await
}

/// Reads a renderer spec (YAML or JSON by extension).
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` on I/O or parse failure.
pub async fn read_renderer_spec(path: &Path) -> Result<RendererSpec, DomainError> {
    read_document(path).await
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("cannot read {}: {e}", path.display())))?;
    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&source).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&source).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| DomainError::Infrastructure(format!("invalid {}: {e}", path.display())))
}

/// Builds the scene registry: scene configs for every presenter-registered
/// course, rendering units for every factory-registered course, and the
/// manifest's lists.
///
/// Registered courses whose files are missing are logged and left out, so
/// they resolve to the placeholder at runtime.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the manifest or any present
/// scene config or renderer spec cannot be read or parsed.
pub async fn load_scene_registry(layout: &CourseLayout) -> Result<SceneRegistry, DomainError> {
    let manifest = load_manifest(layout).await?;
    let mut builder = SceneRegistry::builder().manifest(&manifest);

    for course_id in &manifest.presenter {
        match layout.find_scene_config(course_id).await {
            Some(path) => {
                let config = read_scene_config(&path).await?;
                builder = builder.scene_config(course_id.clone(), config);
            }
            None => warn!(course_id = %course_id, "presenter entry has no scene config"),
        }
    }

    for course_id in &manifest.factory {
        match layout.find_renderer(course_id).await {
            Some(candidate) => {
                let spec = read_renderer_spec(&candidate.path).await?;
                builder = builder.renderer(course_id.clone(), Arc::new(TemplateRenderer::new(spec)));
            }
            None => warn!(course_id = %course_id, "factory entry has no renderer"),
        }
    }

    let registry = builder.build();
    info!(
        scene_configs = manifest.presenter.len(),
        renderers = registry.renderer_count(),
        "scene registry built"
    );
    Ok(registry)
}
