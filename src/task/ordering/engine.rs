//! Shift computation for moves, appends and delete compaction.

use super::plan::{OrderShift, PartitionSnapshot, PlacementChange, RemovalPlan, ShiftPlan};
use crate::task::domain::{PartitionKey, Placement, Task, TaskId, TaskOrder, TaskStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Requested destination of a move, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTarget {
    /// Destination column.
    pub status: TaskStatus,
    /// Requested position; out-of-range values are clamped.
    pub order: i64,
}

impl MoveTarget {
    /// Creates a move target.
    #[must_use]
    pub const fn new(status: TaskStatus, order: i64) -> Self {
        Self { status, order }
    }
}

/// Inconsistencies between a task and the snapshots handed to the engine.
///
/// These indicate a stale read: the caller should reload and plan again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// A snapshot of the wrong partition was supplied.
    #[error("expected snapshot of partition {expected}, got {actual}")]
    PartitionMismatch {
        /// Partition the engine needed.
        expected: PartitionKey,
        /// Partition it was given.
        actual: PartitionKey,
    },

    /// A cross-column move was planned without a destination snapshot.
    #[error("missing snapshot of destination partition {0}")]
    MissingDestination(PartitionKey),

    /// The task is absent from its own partition snapshot, or sits at a
    /// different position there.
    #[error("task {task_id} is not at {placement} in the observed partition")]
    StalePlacement {
        /// Task being planned.
        task_id: TaskId,
        /// Placement recorded on the task value.
        placement: Placement,
    },
}

/// Clamps a requested position into `0..=max`.
#[must_use]
pub fn clamp_order(requested: i64, max: usize) -> TaskOrder {
    let upper = TaskOrder::from_index(max);
    match u32::try_from(requested) {
        Ok(value) => TaskOrder::new(value).min(upper),
        Err(_) if requested < 0 => TaskOrder::FIRST,
        Err(_) => upper,
    }
}

/// Position a newly created task takes: the end of its column.
#[must_use]
pub fn append_order(partition: &PartitionSnapshot) -> TaskOrder {
    TaskOrder::from_index(partition.len())
}

/// Plans moving `task` to `target`.
///
/// `source` must be the snapshot of the task's current partition. A
/// cross-column move also needs `destination`, the snapshot of
/// `(project, target.status)`; it is ignored for same-column moves.
///
/// The requested position is clamped to the last slot of a same-column
/// move, or to the append slot of a cross-column move. A plan that leaves
/// the task in place carries the task's own `updated_at` as its commit time.
///
/// # Errors
///
/// Returns an [`OrderingError`] when the snapshots do not describe the
/// task's partitions as the task value sees them.
pub fn plan_move(
    task: &Task,
    source: &PartitionSnapshot,
    destination: Option<&PartitionSnapshot>,
    target: MoveTarget,
    moved_at: DateTime<Utc>,
) -> Result<ShiftPlan, OrderingError> {
    let old_order = observed_order(task, source)?;
    let from = Placement::new(task.status(), old_order);

    if target.status == task.status() {
        let last = source.len().saturating_sub(1);
        let new_order = clamp_order(target.order, last);
        let shifts = same_column_shifts(task.id(), source, old_order, new_order);
        let moved_at = if new_order == old_order {
            task.updated_at()
        } else {
            moved_at
        };
        return Ok(ShiftPlan {
            project_id: task.project_id(),
            moved: PlacementChange {
                task_id: task.id(),
                from,
                to: Placement::new(target.status, new_order),
            },
            shifts,
            snapshots: vec![source.clone()],
            moved_at,
        });
    }

    let destination_key = PartitionKey::new(task.project_id(), target.status);
    let destination = destination.ok_or(OrderingError::MissingDestination(destination_key))?;
    if destination.key() != destination_key {
        return Err(OrderingError::PartitionMismatch {
            expected: destination_key,
            actual: destination.key(),
        });
    }

    let new_order = clamp_order(target.order, destination.len());
    let closing = source
        .entries()
        .iter()
        .filter(|entry| entry.task_id != task.id() && entry.order > old_order)
        .map(|entry| OrderShift {
            task_id: entry.task_id,
            partition: source.key(),
            from: entry.order,
            to: entry.order.previous(),
        });
    let opening = destination
        .entries()
        .iter()
        .filter(|entry| entry.order >= new_order)
        .map(|entry| OrderShift {
            task_id: entry.task_id,
            partition: destination_key,
            from: entry.order,
            to: entry.order.next(),
        });

    Ok(ShiftPlan {
        project_id: task.project_id(),
        moved: PlacementChange {
            task_id: task.id(),
            from,
            to: Placement::new(target.status, new_order),
        },
        shifts: closing.chain(opening).collect(),
        snapshots: vec![source.clone(), destination.clone()],
        moved_at,
    })
}

/// Plans deleting `task` and closing the gap it leaves in `partition`.
///
/// # Errors
///
/// Returns an [`OrderingError`] when `partition` is not the task's
/// partition or does not hold the task at its recorded position.
pub fn plan_removal(task: &Task, partition: &PartitionSnapshot) -> Result<RemovalPlan, OrderingError> {
    let removed_order = observed_order(task, partition)?;
    let shifts = partition
        .entries()
        .iter()
        .filter(|entry| entry.task_id != task.id() && entry.order > removed_order)
        .map(|entry| OrderShift {
            task_id: entry.task_id,
            partition: partition.key(),
            from: entry.order,
            to: entry.order.previous(),
        })
        .collect();

    Ok(RemovalPlan {
        task_id: task.id(),
        removed_from: Placement::new(task.status(), removed_order),
        shifts,
        snapshot: partition.clone(),
    })
}

fn observed_order(task: &Task, partition: &PartitionSnapshot) -> Result<TaskOrder, OrderingError> {
    if partition.key() != task.partition() {
        return Err(OrderingError::PartitionMismatch {
            expected: task.partition(),
            actual: partition.key(),
        });
    }
    match partition.order_of(task.id()) {
        Some(order) if order == task.order() => Ok(order),
        _ => Err(OrderingError::StalePlacement {
            task_id: task.id(),
            placement: task.placement(),
        }),
    }
}

fn same_column_shifts(
    moved: TaskId,
    partition: &PartitionSnapshot,
    old_order: TaskOrder,
    new_order: TaskOrder,
) -> Vec<OrderShift> {
    partition
        .entries()
        .iter()
        .filter(|entry| entry.task_id != moved)
        .filter_map(|entry| {
            let to = if new_order > old_order && entry.order > old_order && entry.order <= new_order {
                entry.order.previous()
            } else if new_order < old_order && entry.order >= new_order && entry.order < old_order {
                entry.order.next()
            } else {
                return None;
            };
            Some(OrderShift {
                task_id: entry.task_id,
                partition: partition.key(),
                from: entry.order,
                to,
            })
        })
        .collect()
}
