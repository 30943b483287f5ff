//! Read model of a project's Kanban board.

use super::{ProjectId, Task, TaskStatus};
use serde::{Deserialize, Serialize};

/// One column of a board, tasks sorted by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    status: TaskStatus,
    tasks: Vec<Task>,
}

impl BoardColumn {
    /// Returns the column status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the tasks of the column, top first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

/// All four columns of a project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    project_id: ProjectId,
    columns: Vec<BoardColumn>,
}

impl Board {
    /// Groups a project's tasks into columns in [`TaskStatus::ALL`] order.
    ///
    /// Tasks of other projects are ignored.
    #[must_use]
    pub fn from_tasks(project_id: ProjectId, tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut columns: Vec<BoardColumn> = TaskStatus::ALL
            .iter()
            .map(|status| BoardColumn {
                status: *status,
                tasks: Vec::new(),
            })
            .collect();
        for task in tasks {
            if task.project_id() != project_id {
                continue;
            }
            if let Some(column) = columns.iter_mut().find(|c| c.status == task.status()) {
                column.tasks.push(task);
            }
        }
        for column in &mut columns {
            column.tasks.sort_by_key(Task::order);
        }
        Self {
            project_id,
            columns,
        }
    }

    /// Returns the project the board belongs to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    /// Returns the column for `status`.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.status == status)
    }
}
