//! Port contracts for task management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod access;
pub mod changes;
pub mod repository;

pub use access::{ProjectAccess, ProjectAccessError, ProjectAccessResult};
pub use changes::{TaskChange, TaskChangeKind, TaskChangeSink};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
