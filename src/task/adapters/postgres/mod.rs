//! `PostgreSQL` adapter for task persistence.
//!
//! Placement changes run inside one transaction that first takes a
//! transaction-scoped advisory lock per touched partition, then verifies the
//! plan's snapshots, then writes. The `(project_id, status, position)`
//! uniqueness constraint is deferred to commit so intermediate shifts may
//! collide; a commit that loses a position race reports a conflict.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
