//! Domain layer for the Narration context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
pub mod script;
