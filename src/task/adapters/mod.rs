//! Adapters for the task ports.
//!
//! - [`memory`]: thread-safe in-memory repository, project directory and
//!   change sinks
//! - [`postgres`]: `PostgreSQL` task repository using Diesel ORM

pub mod memory;
pub mod postgres;
