//! Scene domain types.

pub mod config;
pub mod manifest;
pub mod renderer;
