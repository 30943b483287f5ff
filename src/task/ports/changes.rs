//! Change notifications for collaborators holding derived views.
//!
//! Dashboard counters and similar aggregates are owned elsewhere. Each
//! committed task mutation is published so those collaborators know which
//! project and which users' views to invalidate.

use crate::task::domain::{Placement, ProjectId, Task, TaskId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskChangeKind {
    /// Task created.
    Created,
    /// Non-positional fields changed.
    Updated,
    /// Task moved to another slot, possibly in another column.
    Reordered {
        /// Placement before the move.
        from: Placement,
        /// Placement after the move.
        to: Placement,
    },
    /// Task deleted.
    Deleted,
    /// Comment counter changed.
    CommentsCounted,
}

/// Committed task mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChange {
    /// What happened.
    pub kind: TaskChangeKind,
    /// Project whose aggregates are stale.
    pub project_id: ProjectId,
    /// Changed task.
    pub task_id: TaskId,
    /// Users whose personal views are stale: creator and assignees before
    /// and after the change, without duplicates.
    pub affected_users: Vec<UserId>,
}

impl TaskChange {
    /// Builds a change for `after`, also covering users only relevant to
    /// `before` (for example a previous assignee).
    #[must_use]
    pub fn between(kind: TaskChangeKind, before: Option<&Task>, after: &Task) -> Self {
        let candidates = before
            .into_iter()
            .flat_map(|task| [Some(task.created_by()), task.assignee()])
            .chain([Some(after.created_by()), after.assignee()])
            .flatten();
        let mut affected_users: Vec<UserId> = Vec::new();
        for user in candidates {
            if !affected_users.contains(&user) {
                affected_users.push(user);
            }
        }
        Self {
            kind,
            project_id: after.project_id(),
            task_id: after.id(),
            affected_users,
        }
    }
}

/// Receiver of committed task changes.
#[async_trait]
pub trait TaskChangeSink: Send + Sync {
    /// Publishes a committed change. Delivery is best effort and cannot
    /// fail the originating operation.
    async fn publish(&self, change: TaskChange);
}
