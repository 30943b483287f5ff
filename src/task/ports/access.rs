//! Access guard port consulted before every task operation.

use crate::task::domain::{ProjectId, ProjectRole, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for access guard lookups.
pub type ProjectAccessResult<T> = Result<T, ProjectAccessError>;

/// Project membership lookup owned by the project collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectAccess: Send + Sync {
    /// Returns the role `user` holds in `project`, or `None` when the user
    /// is neither the owner nor a member.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectAccessError::ProjectNotFound`] for unknown projects.
    async fn role_of(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> ProjectAccessResult<Option<ProjectRole>>;

    /// Returns whether `user` may act on tasks of `project`.
    ///
    /// Any role grants task access.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectAccessError::ProjectNotFound`] for unknown projects.
    async fn has_access(&self, user: UserId, project: ProjectId) -> ProjectAccessResult<bool> {
        Ok(self.role_of(user, project).await?.is_some())
    }
}

/// Errors returned by access guard implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectAccessError {
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The membership source could not be consulted.
    #[error("access guard unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectAccessError {
    /// Wraps a backend error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
