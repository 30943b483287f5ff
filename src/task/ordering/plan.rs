//! Plans produced by the ordering engine and applied by task repositories.

use crate::task::domain::{PartitionKey, Placement, ProjectId, Task, TaskId, TaskOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of one task as observed when a plan was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Task identifier.
    pub task_id: TaskId,
    /// Observed position.
    pub order: TaskOrder,
}

/// Observed state of one partition, sorted by position.
///
/// Plans carry the snapshots they were derived from. A repository must
/// refuse a plan when the current partition differs from its snapshot, so
/// a plan computed from a stale read can never commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    key: PartitionKey,
    entries: Vec<SnapshotEntry>,
}

impl PartitionSnapshot {
    /// Captures the partition `key` from the tasks currently in it.
    ///
    /// Tasks belonging to other partitions are ignored.
    #[must_use]
    pub fn capture<'a>(key: PartitionKey, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut entries: Vec<SnapshotEntry> = tasks
            .into_iter()
            .filter(|task| task.partition() == key)
            .map(|task| SnapshotEntry {
                task_id: task.id(),
                order: task.order(),
            })
            .collect();
        entries.sort_by_key(|entry| (entry.order, entry.task_id));
        Self { key, entries }
    }

    /// Returns the partition key.
    #[must_use]
    pub const fn key(&self) -> PartitionKey {
        self.key
    }

    /// Returns the observed entries, top of the column first.
    #[must_use]
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Returns the number of tasks in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the partition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether `current` describes the same partition state.
    ///
    /// `current` may be in any order.
    #[must_use]
    pub fn matches(&self, current: &[SnapshotEntry]) -> bool {
        if current.len() != self.entries.len() {
            return false;
        }
        let mut sorted = current.to_vec();
        sorted.sort_by_key(|entry| (entry.order, entry.task_id));
        sorted == self.entries
    }

    /// Returns the observed position of `task_id`.
    #[must_use]
    pub fn order_of(&self, task_id: TaskId) -> Option<TaskOrder> {
        self.entries
            .iter()
            .find(|entry| entry.task_id == task_id)
            .map(|entry| entry.order)
    }

    /// Returns whether the observed positions are exactly `0..len`.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(index, entry)| entry.order == TaskOrder::from_index(index))
    }
}

/// Position change of a sibling task inside one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShift {
    /// Shifted task.
    pub task_id: TaskId,
    /// Partition the task stays in.
    pub partition: PartitionKey,
    /// Position before the plan.
    pub from: TaskOrder,
    /// Position after the plan.
    pub to: TaskOrder,
}

/// Placement change of the task being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementChange {
    /// Moved task.
    pub task_id: TaskId,
    /// Placement before the move.
    pub from: Placement,
    /// Placement after the move.
    pub to: Placement,
}

/// Atomic unit of work for moving one task to a new column slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPlan {
    pub(super) project_id: ProjectId,
    pub(super) moved: PlacementChange,
    pub(super) shifts: Vec<OrderShift>,
    pub(super) snapshots: Vec<PartitionSnapshot>,
    pub(super) moved_at: DateTime<Utc>,
}

impl ShiftPlan {
    /// Returns the project the plan operates in.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the moved task's placement change.
    #[must_use]
    pub const fn moved(&self) -> PlacementChange {
        self.moved
    }

    /// Returns the sibling shifts.
    #[must_use]
    pub fn shifts(&self) -> &[OrderShift] {
        &self.shifts
    }

    /// Returns the snapshots the plan was computed from: the source
    /// partition first, then the destination for cross-column moves.
    #[must_use]
    pub fn snapshots(&self) -> &[PartitionSnapshot] {
        &self.snapshots
    }

    /// Returns the timestamp to record as the moved task's `updated_at`.
    #[must_use]
    pub const fn moved_at(&self) -> DateTime<Utc> {
        self.moved_at
    }

    /// Returns whether the plan leaves every task where it is.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.moved.from == self.moved.to && self.shifts.is_empty()
    }

    /// Returns `task` as it looks once the plan has been committed.
    ///
    /// `task` must be the moved task.
    #[must_use]
    pub fn apply_to(&self, mut task: Task) -> Task {
        if task.id() == self.moved.task_id {
            task.relocate(self.moved.to, self.moved_at);
        }
        task
    }
}

/// Atomic unit of work for deleting one task and compacting its column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalPlan {
    pub(super) task_id: TaskId,
    pub(super) removed_from: Placement,
    pub(super) shifts: Vec<OrderShift>,
    pub(super) snapshot: PartitionSnapshot,
}

impl RemovalPlan {
    /// Returns the removed task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the placement the task is removed from.
    #[must_use]
    pub const fn removed_from(&self) -> Placement {
        self.removed_from
    }

    /// Returns the compacting shifts of the remaining siblings.
    #[must_use]
    pub fn shifts(&self) -> &[OrderShift] {
        &self.shifts
    }

    /// Returns the snapshot the plan was computed from.
    #[must_use]
    pub const fn snapshot(&self) -> &PartitionSnapshot {
        &self.snapshot
    }
}
