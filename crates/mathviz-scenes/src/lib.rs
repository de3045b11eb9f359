//! MathViz — Scene Binding bounded context.
//!
//! Maps a course id and the section currently being narrated to a rendering
//! unit and the visual state it draws. Rendering units are pure: the same
//! section and learner parameters always yield the same drawing instruction.

pub mod application;
pub mod domain;
