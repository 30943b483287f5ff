//! In-memory project directory acting as the access guard.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ProjectId, ProjectRole, UserId},
    ports::{ProjectAccess, ProjectAccessError, ProjectAccessResult},
};

/// Thread-safe in-memory record of projects and their members.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectDirectory {
    projects: Arc<RwLock<HashMap<ProjectId, HashMap<UserId, ProjectRole>>>>,
}

impl InMemoryProjectDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a project owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectAccessError::Unavailable`] when the directory lock
    /// is poisoned.
    pub fn add_project(&self, project: ProjectId, owner: UserId) -> ProjectAccessResult<()> {
        let mut projects = self.projects.write().map_err(|err| {
            ProjectAccessError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        projects
            .entry(project)
            .or_default()
            .insert(owner, ProjectRole::Owner);
        Ok(())
    }

    /// Adds or replaces a member's role.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectAccessError::ProjectNotFound`] when the project was
    /// never registered.
    pub fn add_member(
        &self,
        project: ProjectId,
        user: UserId,
        role: ProjectRole,
    ) -> ProjectAccessResult<()> {
        let mut projects = self.projects.write().map_err(|err| {
            ProjectAccessError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        let members = projects
            .get_mut(&project)
            .ok_or(ProjectAccessError::ProjectNotFound(project))?;
        members.insert(user, role);
        Ok(())
    }

    /// Removes a member. Removing an unknown member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectAccessError::ProjectNotFound`] when the project was
    /// never registered.
    pub fn remove_member(&self, project: ProjectId, user: UserId) -> ProjectAccessResult<()> {
        let mut projects = self.projects.write().map_err(|err| {
            ProjectAccessError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        let members = projects
            .get_mut(&project)
            .ok_or(ProjectAccessError::ProjectNotFound(project))?;
        members.remove(&user);
        Ok(())
    }
}

#[async_trait]
impl ProjectAccess for InMemoryProjectDirectory {
    async fn role_of(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> ProjectAccessResult<Option<ProjectRole>> {
        let projects = self.projects.read().map_err(|err| {
            ProjectAccessError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        let members = projects
            .get(&project)
            .ok_or(ProjectAccessError::ProjectNotFound(project))?;
        Ok(members.get(&user).copied())
    }
}
