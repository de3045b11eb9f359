//! Evaluates the registration contract for every script in a course root.
//!
//! Lookups go through [`CourseLayout`], the same candidate lists the runtime
//! registry loader uses, so a course that passes here resolves at runtime.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use mathviz_core::course::{CourseId, RENDERER_SUFFIX};
use mathviz_core::error::DomainError;
use mathviz_course_store::layout::{
    CourseLayout, RENDERER_ENTRY_FILE, RENDERERS_DIR, SCENES_DIR, ScriptFile,
};
use mathviz_course_store::registry_loader::{
    load_manifest, read_renderer_spec, read_scene_config,
};
use mathviz_course_store::repository::FileScriptRepository;
use mathviz_narration::domain::repository::ScriptRepository;
use mathviz_narration::domain::script::NarrationScript;
use mathviz_scenes::domain::manifest::RegistryManifest;
use tracing::{debug, warn};

use crate::report::{CheckReport, CourseReport, Requirement, Violation};

/// Knobs for a check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Accept a non-empty pending-completion list.
    pub allow_pending: bool,
}

/// Checks every script in `<root>/scripts`.
///
/// Script stems are the source of truth for which courses exist. Pending
/// courses are skipped with a warning; a non-empty pending list is itself a
/// violation unless `allow_pending` is set.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the manifest is invalid or the
/// script directory cannot be read.
pub async fn check_catalog(
    layout: &CourseLayout,
    options: CheckOptions,
) -> Result<CheckReport, DomainError> {
    let manifest = load_manifest(layout).await?;
    let repository = FileScriptRepository::new(layout.clone());

    let mut by_stem: BTreeMap<String, Vec<ScriptFile>> = BTreeMap::new();
    for file in layout.script_files().await? {
        by_stem.entry(file.stem.clone()).or_default().push(file);
    }

    let mut report = CheckReport::default();
    let mut known = BTreeSet::new();

    for (stem, files) in by_stem {
        let course_id = match CourseId::parse(&stem) {
            Ok(id) => id,
            Err(err) => {
                report.courses.push(CourseReport {
                    course: stem,
                    pending: false,
                    default_renderer: false,
                    violations: vec![Violation::new(
                        Requirement::CourseId,
                        format!("script file name is not a course id: {err}"),
                    )],
                });
                continue;
            }
        };
        known.insert(course_id.clone());

        if manifest.is_pending(&course_id) {
            warn!(course_id = %course_id, "pending completion; checks skipped");
            report
                .warnings
                .push(format!("{course_id} is pending completion; checks skipped"));
            report.courses.push(CourseReport {
                course: stem,
                pending: true,
                default_renderer: manifest.uses_default_renderer(&course_id),
                violations: Vec::new(),
            });
            continue;
        }

        let violations = check_course(layout, &repository, &manifest, &course_id, &files).await;
        debug!(course_id = %course_id, violations = violations.len(), "course checked");
        report.courses.push(CourseReport {
            course: stem,
            pending: false,
            default_renderer: manifest.uses_default_renderer(&course_id),
            violations,
        });
    }

    if !manifest.pending_completion.is_empty() && !options.allow_pending {
        report.catalog_violations.push(format!(
            "pending_completion must be empty for a release: {}",
            join(&manifest.pending_completion)
        ));
    }
    report.warnings.extend(stale_entries(&manifest, &known));

    for defect in report.defects() {
        warn!(error = %defect, "registration defect");
    }

    Ok(report)
}

async fn check_course(
    layout: &CourseLayout,
    repository: &FileScriptRepository,
    manifest: &RegistryManifest,
    course_id: &CourseId,
    files: &[ScriptFile],
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let script = check_script(repository, course_id, files, &mut violations).await;

    match layout.find_scene_config(course_id).await {
        None => violations.push(Violation::new(
            Requirement::SceneConfig,
            format!(
                "missing scene config (looked for {} in {SCENES_DIR}/)",
                course_id.scene_config_stems().join(", ")
            ),
        )),
        Some(path) => match read_scene_config(&path).await {
            Err(err) => violations.push(Violation::new(Requirement::SceneConfig, err.to_string())),
            Ok(config) => {
                if let Some(script) = &script {
                    for section_id in config.section_ids() {
                        if script.section_index(section_id).is_none() {
                            violations.push(Violation::new(
                                Requirement::SceneBindings,
                                format!(
                                    "{} binds section '{section_id}' which the script does not have",
                                    file_name(&path)
                                ),
                            ));
                        }
                    }
                }
            }
        },
    }

    if !manifest.presenter.contains(course_id) {
        violations.push(Violation::new(
            Requirement::PresenterEntry,
            "not registered in the presenter scene-config map (registry.yaml `presenter`)",
        ));
    }

    if manifest.uses_default_renderer(course_id) {
        return violations;
    }

    match layout.find_renderer(course_id).await {
        None => violations.push(Violation::new(
            Requirement::Renderer,
            format!(
                "missing renderer (looked for {} in {RENDERERS_DIR}/)",
                renderer_names(course_id)
            ),
        )),
        Some(candidate) => {
            if let Err(err) = read_renderer_spec(&candidate.path).await {
                violations.push(Violation::new(Requirement::Renderer, err.to_string()));
            }
        }
    }

    if !manifest.factory.contains(course_id) {
        violations.push(Violation::new(
            Requirement::FactoryEntry,
            "renderer not registered in the factory (registry.yaml `factory`)",
        ));
    }

    if !manifest.has_special_handling(course_id) && !manifest.custom_renderer.contains(course_id) {
        violations.push(Violation::new(
            Requirement::CustomRendererEntry,
            "not in the custom renderer list (registry.yaml `custom_renderer`)",
        ));
    }

    violations
}

async fn check_script(
    repository: &FileScriptRepository,
    course_id: &CourseId,
    files: &[ScriptFile],
    violations: &mut Vec<Violation>,
) -> Option<Arc<NarrationScript>> {
    if files.len() > 1 {
        let names: Vec<_> = files.iter().map(|f| file_name(&f.path)).collect();
        violations.push(Violation::new(
            Requirement::Script,
            format!("more than one script file: {}", names.join(", ")),
        ));
        return None;
    }

    match repository.load_script(course_id).await {
        Ok(stored) => Some(stored.script),
        Err(err) => {
            violations.push(Violation::new(Requirement::Script, err.to_string()));
            None
        }
    }
}

fn stale_entries(manifest: &RegistryManifest, known: &BTreeSet<CourseId>) -> Vec<String> {
    let tables = [
        ("factory", &manifest.factory),
        ("presenter", &manifest.presenter),
        ("custom_renderer", &manifest.custom_renderer),
        ("default_renderer", &manifest.default_renderer),
        ("special_handling", &manifest.special_handling),
        ("pending_completion", &manifest.pending_completion),
    ];
    tables
        .into_iter()
        .flat_map(|(table, ids)| {
            ids.difference(known)
                .map(move |id| format!("registry.yaml `{table}` lists {id}, which has no script"))
        })
        .collect()
}

fn renderer_names(course_id: &CourseId) -> String {
    let names = course_id.renderer_names();
    let directories = names.iter().map(|n| format!("{n}/{RENDERER_ENTRY_FILE}"));
    let files = names.iter().map(|n| format!("{n}{RENDERER_SUFFIX}"));
    directories.chain(files).collect::<Vec<_>>().join(", ")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn join(ids: &BTreeSet<CourseId>) -> String {
    ids.iter().map(CourseId::as_str).collect::<Vec<_>>().join(", ")
}
