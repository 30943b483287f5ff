//! Service layer for task lifecycle and Kanban placement.

use super::{
    config::TaskServiceConfig,
    error::{TaskServiceError, TaskServiceResult},
    requests::{Caller, CreateTaskRequest, ReorderTaskRequest, TaskFilter, UpdateTaskRequest},
};
use crate::task::{
    adapters::memory::NoopChangeSink,
    domain::{Board, NewTask, PartitionKey, ProjectId, Task, TaskId, TaskStatus},
    ordering::{
        MoveTarget, PartitionSnapshot, ShiftPlan, append_order, plan_move, plan_removal,
    },
    ports::{
        ProjectAccess, TaskChange, TaskChangeKind, TaskChangeSink, TaskRepository,
        TaskRepositoryError, TaskRepositoryResult,
    },
};
use mockable::Clock;
use std::{future::Future, sync::Arc};
use tracing::{debug, info, warn};

/// Outcome of one plan-and-commit round.
enum Attempt<T> {
    Committed(T),
    Stale(String),
}

impl<T> Attempt<T> {
    fn from_commit(result: TaskRepositoryResult<()>, committed: T) -> TaskServiceResult<Self> {
        match result {
            Ok(()) => Ok(Self::Committed(committed)),
            Err(TaskRepositoryError::Conflict(partition)) => Ok(Self::Stale(format!(
                "partition {partition} changed before commit"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

/// Task orchestration service.
///
/// Every operation checks project access first. Placement changes are
/// planned by the ordering engine against a fresh snapshot of the affected
/// columns and committed atomically by the repository; when a column moved
/// underneath the plan, the service reads again and plans again.
pub struct TaskBoardService<R, A, C>
where
    R: TaskRepository,
    A: ProjectAccess,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    access: Arc<A>,
    clock: Arc<C>,
    changes: Arc<dyn TaskChangeSink>,
    config: TaskServiceConfig,
}

impl<R, A, C> Clone for TaskBoardService<R, A, C>
where
    R: TaskRepository,
    A: ProjectAccess,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            access: Arc::clone(&self.access),
            clock: Arc::clone(&self.clock),
            changes: Arc::clone(&self.changes),
            config: self.config,
        }
    }
}

impl<R, A, C> TaskBoardService<R, A, C>
where
    R: TaskRepository,
    A: ProjectAccess,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default configuration that publishes
    /// changes nowhere.
    #[must_use]
    pub fn new(repository: Arc<R>, access: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            access,
            clock,
            changes: Arc::new(NoopChangeSink),
            config: TaskServiceConfig::default(),
        }
    }

    /// Publishes committed changes to `sink`.
    #[must_use]
    pub fn with_change_sink(mut self, sink: Arc<dyn TaskChangeSink>) -> Self {
        self.changes = sink;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: TaskServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a task at the end of its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] or
    /// [`TaskServiceError::Forbidden`] when the caller cannot act on the
    /// project, [`TaskServiceError::Validation`] for invalid input, and
    /// [`TaskServiceError::Conflict`] when the column kept changing.
    pub async fn create_task(
        &self,
        caller: Caller,
        project_id: ProjectId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        self.authorize(caller, project_id).await?;
        let data = request.into_new_task(project_id, caller.user_id())?;

        let task = self
            .commit_with_retry("create_task", || self.try_create(data.clone()))
            .await?;

        info!(task = %task.id(), placement = %task.placement(), "created task");
        self.publish(TaskChangeKind::Created, None, &task).await;
        Ok(task)
    }

    /// Returns a task the caller may see.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] or
    /// [`TaskServiceError::Forbidden`].
    pub async fn get_task(&self, caller: Caller, task_id: TaskId) -> TaskServiceResult<Task> {
        self.load_authorized(caller, task_id).await
    }

    /// Lists a project's tasks matching `filter`, by column then position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] or
    /// [`TaskServiceError::Forbidden`].
    pub async fn list_tasks(
        &self,
        caller: Caller,
        project_id: ProjectId,
        filter: &TaskFilter,
    ) -> TaskServiceResult<Vec<Task>> {
        self.authorize(caller, project_id).await?;
        let mut tasks: Vec<Task> = self
            .repository
            .find_by_project(project_id)
            .await?
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect();
        tasks.sort_by_key(|task| (task.status(), task.order()));
        Ok(tasks)
    }

    /// Returns the project's board with every column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] or
    /// [`TaskServiceError::Forbidden`].
    pub async fn board(&self, caller: Caller, project_id: ProjectId) -> TaskServiceResult<Board> {
        self.authorize(caller, project_id).await?;
        let tasks = self.repository.find_by_project(project_id).await?;
        Ok(Board::from_tasks(project_id, tasks))
    }

    /// Changes a task's non-positional fields.
    ///
    /// An empty update returns the task untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for invalid fields or when
    /// the request names a different column, besides the errors of
    /// [`Self::get_task`].
    pub async fn update_task(
        &self,
        caller: Caller,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let before = self.load_authorized(caller, task_id).await?;
        let patch = request.into_patch(&before)?;
        if patch.is_empty() {
            return Ok(before);
        }

        let mut task = before.clone();
        task.apply_details(patch, &*self.clock);
        self.repository.update(&task).await?;

        let updated = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        debug!(task = %task_id, "updated task details");
        self.publish(TaskChangeKind::Updated, Some(&before), &updated)
            .await;
        Ok(updated)
    }

    /// Moves a task to `request.order()` in column `request.status()`.
    ///
    /// The position is clamped: negative values become `0`, and values past
    /// the end become the last slot of the task's own column or the append
    /// slot of another column. Moving a task onto its own placement is still
    /// committed, but leaves `updated_at` alone and publishes no change. The
    /// task is read back after the commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`],
    /// [`TaskServiceError::Forbidden`], [`TaskServiceError::Validation`] for
    /// an unknown column, or [`TaskServiceError::Conflict`] when the
    /// affected columns kept changing.
    pub async fn reorder_task(
        &self,
        caller: Caller,
        task_id: TaskId,
        request: ReorderTaskRequest,
    ) -> TaskServiceResult<Task> {
        self.load_authorized(caller, task_id).await?;
        let target = MoveTarget::new(TaskStatus::try_from(request.status())?, request.order());

        let (before, plan) = self
            .commit_with_retry("reorder_task", || self.try_reorder(task_id, target))
            .await?;
        let after = self.load(task_id).await?;
        if plan.is_noop() {
            return Ok(after);
        }

        let moved = plan.moved();
        info!(
            task = %task_id,
            from = %moved.from,
            to = %moved.to,
            shifted = plan.shifts().len(),
            "moved task"
        );
        self.publish(
            TaskChangeKind::Reordered {
                from: moved.from,
                to: moved.to,
            },
            Some(&before),
            &after,
        )
        .await;
        Ok(after)
    }

    /// Deletes a task and closes the gap it leaves in its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`],
    /// [`TaskServiceError::Forbidden`], or [`TaskServiceError::Conflict`]
    /// when the column kept changing.
    pub async fn delete_task(&self, caller: Caller, task_id: TaskId) -> TaskServiceResult<()> {
        self.load_authorized(caller, task_id).await?;

        let removed = self
            .commit_with_retry("delete_task", || self.try_remove(task_id))
            .await?;

        info!(task = %task_id, placement = %removed.placement(), "deleted task");
        self.publish(TaskChangeKind::Deleted, None, &removed).await;
        Ok(())
    }

    /// Adds `delta` to a task's comment counter, saturating at zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] or
    /// [`TaskServiceError::Forbidden`].
    pub async fn adjust_comments_count(
        &self,
        caller: Caller,
        task_id: TaskId,
        delta: i32,
    ) -> TaskServiceResult<Task> {
        self.load_authorized(caller, task_id).await?;
        let task = self
            .repository
            .adjust_comments_count(task_id, delta)
            .await?;
        debug!(task = %task_id, delta, count = task.comments_count(), "adjusted comment counter");
        self.publish(TaskChangeKind::CommentsCounted, None, &task)
            .await;
        Ok(task)
    }

    async fn try_create(&self, data: NewTask) -> TaskServiceResult<Attempt<Task>> {
        let partition = PartitionKey::new(data.project_id, data.status);
        let snapshot = self.snapshot(partition).await?;
        let task = Task::new(data, append_order(&snapshot), &*self.clock);
        debug!(task = %task.id(), placement = %task.placement(), "planned task append");
        Attempt::from_commit(self.repository.store(&task).await, task)
    }

    async fn try_reorder(
        &self,
        task_id: TaskId,
        target: MoveTarget,
    ) -> TaskServiceResult<Attempt<(Task, ShiftPlan)>> {
        let task = self.load(task_id).await?;
        let source = self.snapshot(task.partition()).await?;
        let destination = if target.status == task.status() {
            None
        } else {
            let key = PartitionKey::new(task.project_id(), target.status);
            Some(self.snapshot(key).await?)
        };

        let plan = match plan_move(
            &task,
            &source,
            destination.as_ref(),
            target,
            self.clock.utc(),
        ) {
            Ok(plan) => plan,
            Err(err) => return Ok(Attempt::Stale(err.to_string())),
        };
        debug!(
            task = %task_id,
            to = %plan.moved().to,
            shifts = plan.shifts().len(),
            "planned task move"
        );
        let result = self.repository.apply_shift(&plan).await;
        Attempt::from_commit(result, (task, plan))
    }

    async fn try_remove(&self, task_id: TaskId) -> TaskServiceResult<Attempt<Task>> {
        let task = self.load(task_id).await?;
        let snapshot = self.snapshot(task.partition()).await?;
        let plan = match plan_removal(&task, &snapshot) {
            Ok(plan) => plan,
            Err(err) => return Ok(Attempt::Stale(err.to_string())),
        };
        debug!(task = %task_id, shifts = plan.shifts().len(), "planned task removal");
        Attempt::from_commit(self.repository.remove(&plan).await, task)
    }

    async fn commit_with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> TaskServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TaskServiceResult<Attempt<T>>>,
    {
        let attempts = self.config.effective_attempts();
        for round in 1..=attempts {
            match attempt().await? {
                Attempt::Committed(value) => return Ok(value),
                Attempt::Stale(reason) => {
                    warn!(operation, round, attempts, %reason, "stale placement, planning again");
                }
            }
        }
        Err(TaskServiceError::Conflict { attempts })
    }

    async fn snapshot(&self, partition: PartitionKey) -> TaskServiceResult<PartitionSnapshot> {
        let tasks = self.repository.find_by_partition(partition).await?;
        Ok(PartitionSnapshot::capture(partition, &tasks))
    }

    async fn load(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }

    async fn load_authorized(&self, caller: Caller, task_id: TaskId) -> TaskServiceResult<Task> {
        let task = self.load(task_id).await?;
        self.authorize(caller, task.project_id()).await?;
        Ok(task)
    }

    async fn authorize(&self, caller: Caller, project_id: ProjectId) -> TaskServiceResult<()> {
        if self
            .access
            .has_access(caller.user_id(), project_id)
            .await?
        {
            return Ok(());
        }
        warn!(user = %caller.user_id(), project = %project_id, "denied task access");
        Err(TaskServiceError::Forbidden {
            user: caller.user_id(),
            project: project_id,
        })
    }

    async fn publish(&self, kind: TaskChangeKind, before: Option<&Task>, after: &Task) {
        self.changes
            .publish(TaskChange::between(kind, before, after))
            .await;
    }
}
