//! Kanban ordering engine.
//!
//! Tasks in one `(project, status)` partition occupy the positions `0..n`
//! exactly. The engine turns a requested move, append or deletion into a
//! plan that keeps every affected partition dense:
//!
//! - a cross-column move closes the gap in the source column and opens a
//!   slot in the destination column;
//! - a same-column move shifts only the tasks between the old and new
//!   positions, by one, towards the vacated slot;
//! - a deletion decrements every task below the deleted one.
//!
//! The engine is pure. It computes plans from [`PartitionSnapshot`]s and
//! leaves applying them to a [`TaskRepository`], which must commit a plan
//! atomically and only while the partitions still match the snapshots.
//!
//! [`TaskRepository`]: crate::task::ports::TaskRepository

mod engine;
mod plan;

pub use engine::{
    MoveTarget, OrderingError, append_order, clamp_order, plan_move, plan_removal,
};
pub use plan::{
    OrderShift, PartitionSnapshot, PlacementChange, RemovalPlan, ShiftPlan, SnapshotEntry,
};
