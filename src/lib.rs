//! Modulor: team project and task tracking.
//!
//! This crate provides the task side of a project tracker: task records,
//! project-scoped Kanban boards, and an ordering engine that keeps task
//! positions dense while users drag tasks between and within columns.
//!
//! # Architecture
//!
//! Modulor follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, board placement and access checks

pub mod task;
