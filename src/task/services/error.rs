//! Service-level errors for task operations.

use crate::task::{
    domain::{ProjectId, TaskDomainError, TaskId, UserId},
    ports::{ProjectAccessError, TaskRepositoryError},
};
use thiserror::Error;

/// Errors returned by [`TaskBoardService`](super::TaskBoardService).
///
/// Missing resources and missing permissions are separate variants so a
/// client can tell "this task is gone" from "you can't touch this task".
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The caller has no access to the project.
    #[error("user {user} has no access to project {project}")]
    Forbidden {
        /// Calling user.
        user: UserId,
        /// Project the caller tried to act on.
        project: ProjectId,
    },

    /// Input validation failed; nothing was changed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// The affected partitions kept changing under concurrent moves.
    #[error("placement changed concurrently on each of {attempts} attempts")]
    Conflict {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// Access guard could not be consulted.
    #[error(transparent)]
    Access(ProjectAccessError),
}

impl TaskServiceError {
    /// Returns whether repeating the whole request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. }
                | Self::Repository(TaskRepositoryError::Conflict(_))
                | Self::Access(ProjectAccessError::Unavailable(_))
        )
    }
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::TaskNotFound(task_id),
            other => Self::Repository(other),
        }
    }
}

impl From<ProjectAccessError> for TaskServiceError {
    fn from(err: ProjectAccessError) -> Self {
        match err {
            ProjectAccessError::ProjectNotFound(project_id) => Self::ProjectNotFound(project_id),
            other => Self::Access(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
