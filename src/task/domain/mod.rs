//! Domain model for project tasks and their Kanban placement.
//!
//! The domain owns task values, validation and the placement vocabulary
//! (column, position, partition) used by the ordering engine. It carries no
//! infrastructure concerns.

mod board;
mod error;
mod ids;
mod payload;
mod placement;
mod status;
mod task;

pub use board::{Board, BoardColumn};
pub use error::TaskDomainError;
pub use ids::{AttachmentId, ProjectId, SubtaskId, TaskId, UserId};
pub use payload::{
    Attachment, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS, Subtask, TaskTitle, normalize_tags,
    validate_description,
};
pub use placement::{PartitionKey, Placement, TaskOrder};
pub use status::{ProjectRole, TaskPriority, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task, TaskDetailsPatch};
