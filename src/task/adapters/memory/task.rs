//! In-memory task repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{PartitionKey, ProjectId, Task, TaskId},
    ordering::{OrderShift, PartitionSnapshot, RemovalPlan, ShiftPlan, SnapshotEntry},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Every placement change runs under a single write lock, which serializes
/// plans across all partitions and makes each one atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    fn partition(&self, key: PartitionKey) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.partition() == key)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.order(), task.id()));
        tasks
    }

    fn partition_len(&self, key: PartitionKey) -> usize {
        self.tasks
            .values()
            .filter(|task| task.partition() == key)
            .count()
    }

    fn ensure_unchanged(&self, snapshot: &PartitionSnapshot) -> TaskRepositoryResult<()> {
        let current: Vec<SnapshotEntry> = self
            .tasks
            .values()
            .filter(|task| task.partition() == snapshot.key())
            .map(|task| SnapshotEntry {
                task_id: task.id(),
                order: task.order(),
            })
            .collect();
        if snapshot.matches(&current) {
            Ok(())
        } else {
            Err(TaskRepositoryError::Conflict(snapshot.key()))
        }
    }

    fn apply_shifts(&mut self, shifts: &[OrderShift]) {
        for shift in shifts {
            if let Some(task) = self.tasks.get_mut(&shift.task_id) {
                task.shift_to(shift.to);
            }
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if task.order().index() != state.partition_len(task.partition()) {
            return Err(TaskRepositoryError::Conflict(task.partition()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        let mut updated = task.clone();
        updated.retain_bookkeeping_from(stored);
        *stored = updated;
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_partition(&self, partition: PartitionKey) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state.partition(partition))
    }

    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .cloned()
            .collect())
    }

    async fn apply_shift(&self, plan: &ShiftPlan) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        for snapshot in plan.snapshots() {
            state.ensure_unchanged(snapshot)?;
        }
        let moved = plan.moved();
        if !state.tasks.contains_key(&moved.task_id) {
            return Err(TaskRepositoryError::NotFound(moved.task_id));
        }
        state.apply_shifts(plan.shifts());
        if let Some(task) = state.tasks.get_mut(&moved.task_id) {
            task.relocate(moved.to, plan.moved_at());
        }
        Ok(())
    }

    async fn remove(&self, plan: &RemovalPlan) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_unchanged(plan.snapshot())?;
        state
            .tasks
            .remove(&plan.task_id())
            .ok_or(TaskRepositoryError::NotFound(plan.task_id()))?;
        state.apply_shifts(plan.shifts());
        Ok(())
    }

    async fn adjust_comments_count(&self, id: TaskId, delta: i32) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        task.adjust_comments_count(delta);
        Ok(task.clone())
    }
}
