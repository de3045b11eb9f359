//! Shared test mocks and fixtures for the MathViz narration core.

mod clock;
mod fixture;
mod repository;
mod script;

pub use clock::FixedClock;
pub use fixture::{CourseFixture, renderer_spec, scene_config_for};
pub use repository::{FailingScriptRepository, InMemoryScriptRepository, RecordingScriptRepository};
pub use script::{ScriptBuilder, demo_script};
