//! Repository port for task persistence and atomic placement changes.

use crate::task::{
    domain::{PartitionKey, ProjectId, Task, TaskId},
    ordering::{RemovalPlan, ShiftPlan},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Positions are owned by the ordering engine. Implementations must apply
/// [`ShiftPlan`]s and [`RemovalPlan`]s as one atomic unit, serialized
/// against every other placement change touching the same partitions, and
/// must reject a plan with [`TaskRepositoryError::Conflict`] when a touched
/// partition no longer matches the plan's snapshot.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task at the end of its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists, or [`TaskRepositoryError::Conflict`] when the task's
    /// position is not the current size of its partition.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to the non-positional fields of an existing task.
    ///
    /// The stored status and position are left untouched whatever the
    /// given task value says.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks of one partition sorted by position.
    async fn find_by_partition(&self, partition: PartitionKey) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task of a project, in no particular order.
    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies a move plan atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Conflict`] without changing anything
    /// when a touched partition differs from the plan's snapshots.
    async fn apply_shift(&self, plan: &ShiftPlan) -> TaskRepositoryResult<()>;

    /// Deletes a task and compacts its former partition atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Conflict`] without changing anything
    /// when the partition differs from the plan's snapshot.
    async fn remove(&self, plan: &RemovalPlan) -> TaskRepositoryResult<()>;

    /// Adds `delta` to a task's comment counter, saturating at zero, and
    /// returns the updated task.
    ///
    /// Counters sit outside the ordering invariant, so this does not take
    /// part in partition conflict detection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn adjust_comments_count(&self, id: TaskId, delta: i32) -> TaskRepositoryResult<Task>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The partition changed between planning and commit.
    #[error("partition {0} changed concurrently")]
    Conflict(PartitionKey),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether re-reading and retrying the operation may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
