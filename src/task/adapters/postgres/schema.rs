//! Diesel schema for task persistence.

diesel::table! {
    /// Task records with their Kanban placement.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Board column.
        #[max_length = 20]
        status -> Varchar,
        /// Zero-based position within the `(project_id, status)` partition.
        position -> Int4,
        /// Task priority.
        #[max_length = 10]
        priority -> Varchar,
        /// Assigned user, if any.
        assignee_id -> Nullable<Uuid>,
        /// Creating user.
        created_by -> Uuid,
        /// Due date, if any.
        due_date -> Nullable<Timestamptz>,
        /// Tag list.
        tags -> Jsonb,
        /// Checklist items.
        subtasks -> Jsonb,
        /// Attached files.
        attachments -> Jsonb,
        /// Comment counter maintained by the comment collaborator.
        comments_count -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
