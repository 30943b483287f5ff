//! Column placement of a task: status column, position and partition key.

use super::{ProjectId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based position of a task within its column.
///
/// Within one `(project, status)` partition the positions of all tasks form
/// the contiguous sequence `0..n` with no gaps and no duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskOrder(u32);

impl TaskOrder {
    /// The first slot of a column.
    pub const FIRST: Self = Self(0);

    /// Creates a position from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates a position from a slice index, saturating at `u32::MAX`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Returns the raw position value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the position as a slice index.
    #[must_use]
    pub fn index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    /// Returns the next slot down the column.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the previous slot up the column, stopping at the top.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for TaskOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column and position of a task on its project board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    status: TaskStatus,
    order: TaskOrder,
}

impl Placement {
    /// Creates a placement.
    #[must_use]
    pub const fn new(status: TaskStatus, order: TaskOrder) -> Self {
        Self { status, order }
    }

    /// Returns the column.
    #[must_use]
    pub const fn status(self) -> TaskStatus {
        self.status
    }

    /// Returns the position within the column.
    #[must_use]
    pub const fn order(self) -> TaskOrder {
        self.order
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.status, self.order)
    }
}

/// Scope within which task positions must be dense: one column of one
/// project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    project_id: ProjectId,
    status: TaskStatus,
}

impl PartitionKey {
    /// Creates a partition key.
    #[must_use]
    pub const fn new(project_id: ProjectId, status: TaskStatus) -> Self {
        Self { project_id, status }
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(self) -> ProjectId {
        self.project_id
    }

    /// Returns the column.
    #[must_use]
    pub const fn status(self) -> TaskStatus {
        self.status
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.status)
    }
}
