//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Owning project.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub project_id: uuid::Uuid,
    /// Task title.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub title: String,
    /// Task description.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub description: String,
    /// Board column.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub status: String,
    /// Position within the column.
    #[diesel(sql_type = diesel::sql_types::Int4)]
    pub position: i32,
    /// Task priority.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub priority: String,
    /// Assigned user.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Uuid>)]
    pub assignee_id: Option<uuid::Uuid>,
    /// Creating user.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub created_by: uuid::Uuid,
    /// Due date.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub due_date: Option<DateTime<Utc>>,
    /// Tag list JSON.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub tags: Value,
    /// Checklist JSON.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub subtasks: Value,
    /// Attachments JSON.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub attachments: Value,
    /// Comment counter.
    #[diesel(sql_type = diesel::sql_types::Int4)]
    pub comments_count: i32,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Board column.
    pub status: String,
    /// Position within the column.
    pub position: i32,
    /// Task priority.
    pub priority: String,
    /// Assigned user.
    pub assignee_id: Option<uuid::Uuid>,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Tag list JSON.
    pub tags: Value,
    /// Checklist JSON.
    pub subtasks: Value,
    /// Attachments JSON.
    pub attachments: Value,
    /// Comment counter.
    pub comments_count: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the non-positional columns of a task.
///
/// Status, position and the comment counter are written elsewhere.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskDetailsChangeset {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task priority.
    pub priority: String,
    /// Assigned user; `None` clears the assignment.
    pub assignee_id: Option<uuid::Uuid>,
    /// Due date; `None` clears it.
    pub due_date: Option<DateTime<Utc>>,
    /// Tag list JSON.
    pub tags: Value,
    /// Checklist JSON.
    pub subtasks: Value,
    /// Attachments JSON.
    pub attachments: Value,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Position of one task, as read while checking a partition snapshot.
#[derive(Debug, Clone, Copy, Queryable)]
pub struct PositionRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Position within the column.
    pub position: i32,
}
