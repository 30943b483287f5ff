//! Request payloads accepted by the task service.

use crate::task::domain::{
    Attachment, NewTask, ProjectId, Subtask, Task, TaskDetailsPatch, TaskDomainError,
    TaskPriority, TaskStatus, TaskTitle, UserId, normalize_tags, validate_description,
};
use chrono::{DateTime, Utc};

/// Authenticated identity on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caller {
    user_id: UserId,
}

impl Caller {
    /// Wraps an authenticated user identifier.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Returns the authenticated user.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.user_id
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<UserId>,
    due_date: Option<DateTime<Utc>>,
    tags: Vec<String>,
    subtasks: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            assignee: None,
            due_date: None,
            tags: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the column to append the task to. Defaults to `todo`.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the priority. Defaults to `medium`.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the checklist, one open subtask per title.
    #[must_use]
    pub fn with_subtasks(mut self, titles: impl IntoIterator<Item = String>) -> Self {
        self.subtasks = titles.into_iter().collect();
        self
    }

    pub(super) fn into_new_task(
        self,
        project_id: ProjectId,
        created_by: UserId,
    ) -> Result<NewTask, TaskDomainError> {
        let title = TaskTitle::new(self.title)?;
        let description = validate_description(self.description.unwrap_or_default())?;
        let status = self
            .status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()?
            .unwrap_or_default();
        let priority = self
            .priority
            .as_deref()
            .map(TaskPriority::try_from)
            .transpose()?
            .unwrap_or_default();
        let subtasks = self
            .subtasks
            .into_iter()
            .map(Subtask::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewTask {
            project_id,
            created_by,
            title,
            description,
            status,
            priority,
            assignee: self.assignee,
            due_date: self.due_date,
            tags: normalize_tags(self.tags),
            subtasks,
            attachments: Vec::new(),
        })
    }
}

/// Request payload for changing a task's non-positional fields.
///
/// A `status` may be echoed back unchanged; moving a task to another
/// column requires [`ReorderTaskRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<Option<UserId>>,
    due_date: Option<Option<DateTime<Utc>>>,
    tags: Option<Vec<String>>,
    subtasks: Option<Vec<Subtask>>,
    attachments: Option<Vec<Attachment>>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Echoes a status. Must equal the task's current column.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Assigns the task, or clears the assignment with `None`.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the due date, or clears it with `None`.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Replaces the checklist.
    #[must_use]
    pub fn with_subtasks(mut self, subtasks: impl IntoIterator<Item = Subtask>) -> Self {
        self.subtasks = Some(subtasks.into_iter().collect());
        self
    }

    /// Replaces the attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = Some(attachments.into_iter().collect());
        self
    }

    pub(super) fn into_patch(self, current: &Task) -> Result<TaskDetailsPatch, TaskDomainError> {
        if let Some(raw) = self.status.as_deref() {
            let requested = TaskStatus::try_from(raw)?;
            if requested != current.status() {
                return Err(TaskDomainError::StatusChangeRequiresReorder {
                    current: current.status(),
                    requested,
                });
            }
        }

        Ok(TaskDetailsPatch {
            title: self.title.map(TaskTitle::new).transpose()?,
            description: self.description.map(validate_description).transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(TaskPriority::try_from)
                .transpose()?,
            assignee: self.assignee,
            due_date: self.due_date,
            tags: self.tags.map(normalize_tags),
            subtasks: self.subtasks,
            attachments: self.attachments,
        })
    }
}

/// Request payload for a drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderTaskRequest {
    status: String,
    order: i64,
}

impl ReorderTaskRequest {
    /// Creates a move to `order` in column `status`.
    ///
    /// `order` is clamped into the legal range of the destination column.
    #[must_use]
    pub fn new(status: impl Into<String>, order: i64) -> Self {
        Self {
            status: status.into(),
            order,
        }
    }

    /// Returns the requested column as given.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the requested position as given.
    #[must_use]
    pub const fn order(&self) -> i64 {
        self.order
    }
}

/// Criteria for listing a project's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    assignee: Option<UserId>,
    search: Option<String>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to one assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Restricts to titles containing `search`, ignoring case.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into().to_lowercase());
        self
    }

    /// Returns whether `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self
                .assignee
                .is_none_or(|assignee| task.assignee() == Some(assignee))
            && self.search.as_deref().is_none_or(|needle| {
                task.title().as_str().to_lowercase().contains(needle)
            })
    }
}
