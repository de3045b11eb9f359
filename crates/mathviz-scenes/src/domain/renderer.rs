//! Rendering units and the drawing instructions they produce.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::{SceneKind, SceneParameters, SceneState};

/// One drawable layer of a scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawLayer {
    /// Layer id, stable across renders.
    pub id: String,
    /// Primitive the drawing surface should use, e.g. `pie-chart`.
    pub primitive: String,
    /// Parameters for the primitive.
    pub params: SceneParameters,
    /// Whether the layer is emphasized.
    pub highlighted: bool,
}

/// Everything an external drawing surface needs to paint one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawInstruction {
    /// Name of the unit that produced the instruction.
    pub renderer: String,
    /// Section the instruction is for.
    pub section_id: String,
    /// Kind of picture.
    pub kind: SceneKind,
    /// Layers in paint order.
    pub layers: Vec<DrawLayer>,
}

/// A rendering unit: a pure function from scene state to drawing instruction.
///
/// Implementations hold no narration state, so rendering the same state
/// twice yields the same instruction.
pub trait SceneRenderer: Send + Sync + fmt::Debug {
    /// Name used in logs and in the factory table.
    fn name(&self) -> &str;

    /// Produces the drawing instruction for `state`.
    fn render(&self, state: &SceneState) -> DrawInstruction;
}

/// The shared unit for courses without a dedicated renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl DefaultRenderer {
    /// Name of the shared unit.
    pub const NAME: &'static str = "default";
}

impl SceneRenderer for DefaultRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, state: &SceneState) -> DrawInstruction {
        let primitive = match state.kind {
            SceneKind::Title => "title-card",
            SceneKind::Text | SceneKind::Summary => "text-panel",
            SceneKind::Formula => "formula-block",
            SceneKind::Waveform | SceneKind::Spectrum => "line-chart",
            SceneKind::Comparison => "split-panel",
            _ => "illustration",
        };
        DrawInstruction {
            renderer: Self::NAME.to_owned(),
            section_id: state.section_id.clone(),
            kind: state.kind,
            layers: vec![DrawLayer {
                id: "main".to_owned(),
                primitive: primitive.to_owned(),
                params: state.params.clone(),
                highlighted: false,
            }],
        }
    }
}

/// The unit shown when a course's registration is incomplete.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    /// Name of the placeholder unit.
    pub const NAME: &'static str = "placeholder";
}

impl SceneRenderer for PlaceholderRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, state: &SceneState) -> DrawInstruction {
        let mut params = SceneParameters::new();
        params.insert("message".to_owned(), "Content loading".into());
        DrawInstruction {
            renderer: Self::NAME.to_owned(),
            section_id: state.section_id.clone(),
            kind: SceneKind::Text,
            layers: vec![DrawLayer {
                id: "loading".to_owned(),
                primitive: "placeholder".to_owned(),
                params,
                highlighted: false,
            }],
        }
    }
}

/// A declared layer of a [`RendererSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer id.
    pub id: String,
    /// Drawing primitive.
    pub primitive: String,
    /// Only draw for these kinds. Empty means every kind.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<SceneKind>,
    /// Only draw for these section ids. Empty means every section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
    /// Parameter names forwarded to the primitive. Empty forwards all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bind: Vec<String>,
}

/// A course renderer as authored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererSpec {
    /// Renderer name, e.g. `Fractions`.
    pub name: String,
    /// Layers in paint order.
    pub layers: Vec<LayerSpec>,
}

/// A course-specific unit built from a [`RendererSpec`].
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    spec: RendererSpec,
}

impl TemplateRenderer {
    /// Wraps a spec.
    #[must_use]
    pub fn new(spec: RendererSpec) -> Self {
        Self { spec }
    }
}

impl SceneRenderer for TemplateRenderer {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn render(&self, state: &SceneState) -> DrawInstruction {
        let layers = self
            .spec
            .layers
            .iter()
            .filter(|layer| layer.kinds.is_empty() || layer.kinds.contains(&state.kind))
            .filter(|layer| layer.sections.is_empty() || layer.sections.contains(&state.section_id))
            .map(|layer| {
                let params: SceneParameters = if layer.bind.is_empty() {
                    state.params.clone()
                } else {
                    state
                        .params
                        .iter()
                        .filter(|(key, _)| layer.bind.contains(key))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect()
                };
                let highlighted = state
                    .highlight
                    .iter()
                    .any(|name| *name == layer.id || layer.bind.contains(name));
                DrawLayer {
                    id: layer.id.clone(),
                    primitive: layer.primitive.clone(),
                    params,
                    highlighted,
                }
            })
            .collect();

        DrawInstruction {
            renderer: self.spec.name.clone(),
            section_id: state.section_id.clone(),
            kind: state.kind,
            layers,
        }
    }
}
