//! Task aggregate root.

use super::{
    Attachment, PartitionKey, Placement, ProjectId, Subtask, TaskId, TaskOrder, TaskPriority,
    TaskStatus, TaskTitle, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
///
/// Placement (`status` and `order`) is read-only from outside the crate: it
/// changes only through the ordering engine's plans, as applied by a task
/// repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    title: TaskTitle,
    description: String,
    status: TaskStatus,
    order: TaskOrder,
    priority: TaskPriority,
    assignee: Option<UserId>,
    created_by: UserId,
    due_date: Option<DateTime<Utc>>,
    tags: Vec<String>,
    subtasks: Vec<Subtask>,
    attachments: Vec<Attachment>,
    comments_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning project.
    pub project_id: ProjectId,
    /// User creating the task.
    pub created_by: UserId,
    /// Validated title.
    pub title: TaskTitle,
    /// Validated description.
    pub description: String,
    /// Column the task is appended to.
    pub status: TaskStatus,
    /// Initial priority.
    pub priority: TaskPriority,
    /// Initial assignee, if any.
    pub assignee: Option<UserId>,
    /// Due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Normalized tags.
    pub tags: Vec<String>,
    /// Initial checklist.
    pub subtasks: Vec<Subtask>,
    /// Initial attachments.
    pub attachments: Vec<Attachment>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning project.
    pub project_id: ProjectId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: String,
    /// Persisted column.
    pub status: TaskStatus,
    /// Persisted position within the column.
    pub order: TaskOrder,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted assignee.
    pub assignee: Option<UserId>,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted tags.
    pub tags: Vec<String>,
    /// Persisted checklist.
    pub subtasks: Vec<Subtask>,
    /// Persisted attachments.
    pub attachments: Vec<Attachment>,
    /// Persisted comment counter.
    pub comments_count: u32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changes to the non-positional fields of a task.
///
/// `None` leaves a field untouched. For nullable fields the inner `Option`
/// distinguishes "clear" (`Some(None)`) from "leave as is" (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetailsPatch {
    /// New title.
    pub title: Option<TaskTitle>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New or cleared assignee.
    pub assignee: Option<Option<UserId>>,
    /// New or cleared due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// Replacement checklist.
    pub subtasks: Option<Vec<Subtask>>,
    /// Replacement attachment list.
    pub attachments: Option<Vec<Attachment>>,
}

impl TaskDetailsPatch {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.subtasks.is_none()
            && self.attachments.is_none()
    }
}

impl Task {
    /// Creates a task at the given position of its column.
    ///
    /// The caller is responsible for choosing `order` as the current size of
    /// the target column; repositories reject the insert otherwise.
    #[must_use]
    pub fn new(data: NewTask, order: TaskOrder, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            status: data.status,
            order,
            priority: data.priority,
            assignee: data.assignee,
            created_by: data.created_by,
            due_date: data.due_date,
            tags: data.tags,
            subtasks: data.subtasks,
            attachments: data.attachments,
            comments_count: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            status: data.status,
            order: data.order,
            priority: data.priority,
            assignee: data.assignee,
            created_by: data.created_by,
            due_date: data.due_date,
            tags: data.tags,
            subtasks: data.subtasks,
            attachments: data.attachments,
            comments_count: data.comments_count,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the position within the column.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns column and position together.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        Placement::new(self.status, self.order)
    }

    /// Returns the partition whose density this task participates in.
    #[must_use]
    pub const fn partition(&self) -> PartitionKey {
        PartitionKey::new(self.project_id, self.status)
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the checklist.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns the number of comments recorded against the task.
    #[must_use]
    pub const fn comments_count(&self) -> u32 {
        self.comments_count
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a non-positional patch. An empty patch leaves the task,
    /// including `updated_at`, unchanged.
    pub fn apply_details(&mut self, patch: TaskDetailsPatch, clock: &impl Clock) {
        if patch.is_empty() {
            return;
        }
        let TaskDetailsPatch {
            title,
            description,
            priority,
            assignee,
            due_date,
            tags,
            subtasks,
            attachments,
        } = patch;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = priority {
            self.priority = value;
        }
        if let Some(value) = assignee {
            self.assignee = value;
        }
        if let Some(value) = due_date {
            self.due_date = value;
        }
        if let Some(value) = tags {
            self.tags = value;
        }
        if let Some(value) = subtasks {
            self.subtasks = value;
        }
        if let Some(value) = attachments {
            self.attachments = value;
        }
        self.updated_at = clock.utc();
    }

    /// Moves the task to `to`, stamping `updated_at` only when the placement
    /// actually changes.
    pub(crate) fn relocate(&mut self, to: Placement, at: DateTime<Utc>) {
        if self.placement() == to {
            return;
        }
        self.status = to.status();
        self.order = to.order();
        self.updated_at = at;
    }

    /// Shifts the task within its column as a side effect of a sibling's
    /// move. Sibling shifts are bookkeeping and do not touch `updated_at`.
    pub(crate) const fn shift_to(&mut self, order: TaskOrder) {
        self.order = order;
    }

    /// Copies the fields `stored` owns outside a details update: placement,
    /// which belongs to the ordering engine, and the comment counter, which
    /// the comment collaborator maintains independently.
    pub(crate) const fn retain_bookkeeping_from(&mut self, stored: &Self) {
        self.status = stored.status;
        self.order = stored.order;
        self.comments_count = stored.comments_count;
    }

    /// Adds `delta` to the comment counter, saturating at zero.
    pub(crate) const fn adjust_comments_count(&mut self, delta: i32) {
        self.comments_count = if delta >= 0 {
            self.comments_count.saturating_add(delta.unsigned_abs())
        } else {
            self.comments_count.saturating_sub(delta.unsigned_abs())
        };
    }
}
