//! MathViz Core — shared domain abstractions.
//!
//! This crate defines the traits and types every narration-side crate
//! depends on: the error taxonomy, the aggregate and event abstractions,
//! and the course identifier with its file-naming rule. It contains no
//! infrastructure code.

pub mod aggregate;
pub mod command;
pub mod course;
pub mod error;
pub mod event;
