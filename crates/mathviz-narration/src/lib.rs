//! MathViz — Narration bounded context.
//!
//! Responsible for the narrated course script model, the playback state
//! machine that walks a script line by line, and the session that publishes
//! playback state to any number of observers while owning the cancellable
//! auto-advance timer.

pub mod application;
pub mod domain;
