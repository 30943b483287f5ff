//! Step definitions for Kanban ordering scenarios.

pub mod then;
pub mod when;
pub mod world;
