//! MathViz — course catalog storage.
//!
//! Knows where a course root keeps scripts, scene configs, renderers and the
//! registry manifest, and loads them. The candidate-path functions in
//! [`layout`] are the single lookup order shared by the runtime loader and
//! the consistency checker.

pub mod layout;
pub mod registry_loader;
pub mod repository;

pub use layout::CourseLayout;
pub use registry_loader::{load_manifest, load_scene_registry};
pub use repository::FileScriptRepository;
