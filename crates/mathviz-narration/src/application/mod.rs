//! Application layer for the Narration context.

pub mod session;
pub mod views;
