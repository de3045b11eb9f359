//! Route modules.

pub mod courses;
pub mod health;
pub mod sessions;
