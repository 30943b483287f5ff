//! Error types for task domain validation and parsing.

use super::{TaskStatus, payload};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the character limit.
    #[error("task title has {actual} characters, maximum is {}", payload::MAX_TITLE_CHARS)]
    TitleTooLong {
        /// Character count of the rejected title.
        actual: usize,
    },

    /// The task description exceeds the character limit.
    #[error(
        "task description has {actual} characters, maximum is {}",
        payload::MAX_DESCRIPTION_CHARS
    )]
    DescriptionTooLong {
        /// Character count of the rejected description.
        actual: usize,
    },

    /// A subtask title is empty after trimming.
    #[error("subtask title must not be empty")]
    EmptySubtaskTitle,

    /// A subtask title exceeds the character limit.
    #[error("subtask title has {actual} characters, maximum is {}", payload::MAX_TITLE_CHARS)]
    SubtaskTitleTooLong {
        /// Character count of the rejected subtask title.
        actual: usize,
    },

    /// A required attachment field is empty.
    #[error("attachment {0} must not be empty")]
    EmptyAttachmentField(&'static str),

    /// The status value is not one of the board columns.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),

    /// The priority value is not supported.
    #[error("unknown task priority: {0}")]
    UnknownPriority(String),

    /// The project role value is not supported.
    #[error("unknown project role: {0}")]
    UnknownRole(String),

    /// A field update attempted to move the task to another column.
    #[error("cannot change status from {current} to {requested} outside a reorder")]
    StatusChangeRequiresReorder {
        /// Column the task currently sits in.
        current: TaskStatus,
        /// Column requested by the update payload.
        requested: TaskStatus,
    },
}
