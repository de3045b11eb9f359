//! Scene resolution.

pub mod registry;
