//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, PositionRow, TaskDetailsChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        PartitionKey, PersistedTaskData, ProjectId, Task, TaskId, TaskOrder, TaskPriority,
        TaskStatus, TaskTitle, UserId,
    },
    ordering::{OrderShift, PartitionSnapshot, RemovalPlan, ShiftPlan, SnapshotEntry},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Columns returned by raw `RETURNING` queries, in [`TaskRow`] field order.
const TASK_COLUMNS: &str = concat!(
    "id, project_id, title, description, status, position, priority, assignee_id, ",
    "created_by, due_date, tags, subtasks, attachments, comments_count, created_at, updated_at",
);

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Failure inside a placement transaction, kept apart from the port error
/// until the commit outcome is known.
#[derive(Debug)]
enum PlacementTxError {
    Repository(TaskRepositoryError),
    Database(DieselError),
}

impl From<TaskRepositoryError> for PlacementTxError {
    fn from(err: TaskRepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<DieselError> for PlacementTxError {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl PlacementTxError {
    /// Maps position races lost to a concurrent writer onto a conflict on
    /// `contested`.
    fn into_repository_error(self, contested: PartitionKey) -> TaskRepositoryError {
        match self {
            Self::Repository(err) => err,
            Self::Database(err) if is_position_race(&err) => {
                TaskRepositoryError::Conflict(contested)
            }
            Self::Database(err) => TaskRepositoryError::persistence(err),
        }
    }
}

/// Deferred `(project_id, status, position)` violations surface at commit;
/// serialization failures abort the transaction the same way.
const fn is_position_race(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::SerializationFailure,
            _
        )
    )
}

/// Runs `work` in one transaction holding the advisory locks of
/// `partitions`, reporting lost position races as a conflict on `contested`.
fn placement_transaction<T, F>(
    connection: &mut PgConnection,
    contested: PartitionKey,
    partitions: &[PartitionKey],
    work: F,
) -> TaskRepositoryResult<T>
where
    F: FnOnce(&mut PgConnection) -> Result<T, PlacementTxError>,
{
    connection
        .transaction::<_, PlacementTxError, _>(|tx| {
            lock_partitions(tx, partitions)?;
            work(tx)
        })
        .map_err(|err| err.into_repository_error(contested))
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let partition = task.partition();
        let position = order_to_db(task.order())?;
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            placement_transaction(connection, partition, &[partition], |tx| {
                let existing: i64 = tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .count()
                    .get_result(tx)?;
                if existing > 0 {
                    return Err(TaskRepositoryError::DuplicateTask(task_id).into());
                }

                let size: i64 = partition_query(partition).count().get_result(tx)?;
                if size != i64::from(position) {
                    return Err(TaskRepositoryError::Conflict(partition).into());
                }

                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if info.constraint_name() == Some("tasks_pkey") =>
                        {
                            PlacementTxError::Repository(TaskRepositoryError::DuplicateTask(
                                task_id,
                            ))
                        }
                        other => PlacementTxError::Database(other),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_details_changeset(task)?;
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changeset)
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_partition(&self, partition: PartitionKey) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = partition_query(partition)
                .order((tasks::position.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn apply_shift(&self, plan: &ShiftPlan) -> TaskRepositoryResult<()> {
        let plan = plan.clone();
        let moved = plan.moved();
        let contested = PartitionKey::new(plan.project_id(), moved.to.status());
        let partitions: Vec<PartitionKey> =
            plan.snapshots().iter().map(PartitionSnapshot::key).collect();
        self.run_blocking(move |connection| {
            placement_transaction(connection, contested, &partitions, |tx| {
                for snapshot in plan.snapshots() {
                    ensure_unchanged(tx, snapshot)?;
                }

                write_shifts(tx, plan.shifts())?;

                if moved.from != moved.to {
                    diesel::update(tasks::table.find(moved.task_id.into_inner()))
                        .set((
                            tasks::status.eq(moved.to.status().as_str()),
                            tasks::position.eq(order_to_db(moved.to.order())?),
                            tasks::updated_at.eq(plan.moved_at()),
                        ))
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn remove(&self, plan: &RemovalPlan) -> TaskRepositoryResult<()> {
        let plan = plan.clone();
        let partition = plan.snapshot().key();
        self.run_blocking(move |connection| {
            placement_transaction(connection, partition, &[partition], |tx| {
                ensure_unchanged(tx, plan.snapshot())?;

                let deleted =
                    diesel::delete(tasks::table.find(plan.task_id().into_inner())).execute(tx)?;
                if deleted == 0 {
                    return Err(TaskRepositoryError::NotFound(plan.task_id()).into());
                }
                write_shifts(tx, plan.shifts())?;
                Ok(())
            })
        })
        .await
    }

    async fn adjust_comments_count(&self, id: TaskId, delta: i32) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let query = format!(
                "UPDATE tasks SET comments_count = GREATEST(comments_count + $1, 0) \
                 WHERE id = $2 RETURNING {TASK_COLUMNS}"
            );
            let row = diesel::sql_query(query)
                .bind::<diesel::sql_types::Int4, _>(delta)
                .bind::<diesel::sql_types::Uuid, _>(id.into_inner())
                .get_result::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task)
                .transpose()?
                .ok_or(TaskRepositoryError::NotFound(id))
        })
        .await
    }
}

fn partition_query(partition: PartitionKey) -> tasks::BoxedQuery<'static, diesel::pg::Pg> {
    tasks::table
        .filter(tasks::project_id.eq(partition.project_id().into_inner()))
        .filter(tasks::status.eq(partition.status().as_str()))
        .into_boxed()
}

/// Serializes placement changes per partition for the rest of the
/// transaction. Locks are taken in key order so two plans touching the same
/// pair of columns cannot deadlock.
fn lock_partitions(
    connection: &mut PgConnection,
    partitions: &[PartitionKey],
) -> TaskRepositoryResult<()> {
    let mut keys = partitions.to_vec();
    keys.sort();
    keys.dedup();
    for key in keys {
        diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind::<diesel::sql_types::Text, _>(key.to_string())
            .execute(connection)?;
    }
    Ok(())
}

fn ensure_unchanged(
    connection: &mut PgConnection,
    snapshot: &PartitionSnapshot,
) -> TaskRepositoryResult<()> {
    let rows = partition_query(snapshot.key())
        .select((tasks::id, tasks::position))
        .load::<PositionRow>(connection)?;
    let current = rows
        .into_iter()
        .map(|row| {
            Ok(SnapshotEntry {
                task_id: TaskId::from_uuid(row.id),
                order: order_from_db(row.position)?,
            })
        })
        .collect::<TaskRepositoryResult<Vec<_>>>()?;
    if snapshot.matches(&current) {
        Ok(())
    } else {
        Err(TaskRepositoryError::Conflict(snapshot.key()))
    }
}

fn write_shifts(connection: &mut PgConnection, shifts: &[OrderShift]) -> TaskRepositoryResult<()> {
    for shift in shifts {
        diesel::update(tasks::table.find(shift.task_id.into_inner()))
            .set(tasks::position.eq(order_to_db(shift.to)?))
            .execute(connection)?;
    }
    Ok(())
}

fn order_to_db(order: TaskOrder) -> TaskRepositoryResult<i32> {
    i32::try_from(order.value()).map_err(TaskRepositoryError::persistence)
}

fn order_from_db(position: i32) -> TaskRepositoryResult<TaskOrder> {
    u32::try_from(position)
        .map(TaskOrder::new)
        .map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        position: order_to_db(task.order())?,
        priority: task.priority().as_str().to_owned(),
        assignee_id: task.assignee().map(UserId::into_inner),
        created_by: task.created_by().into_inner(),
        due_date: task.due_date(),
        tags: serde_json::to_value(task.tags()).map_err(TaskRepositoryError::persistence)?,
        subtasks: serde_json::to_value(task.subtasks())
            .map_err(TaskRepositoryError::persistence)?,
        attachments: serde_json::to_value(task.attachments())
            .map_err(TaskRepositoryError::persistence)?,
        comments_count: i32::try_from(task.comments_count())
            .map_err(TaskRepositoryError::persistence)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_details_changeset(task: &Task) -> TaskRepositoryResult<TaskDetailsChangeset> {
    Ok(TaskDetailsChangeset {
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        priority: task.priority().as_str().to_owned(),
        assignee_id: task.assignee().map(UserId::into_inner),
        due_date: task.due_date(),
        tags: serde_json::to_value(task.tags()).map_err(TaskRepositoryError::persistence)?,
        subtasks: serde_json::to_value(task.subtasks())
            .map_err(TaskRepositoryError::persistence)?,
        attachments: serde_json::to_value(task.attachments())
            .map_err(TaskRepositoryError::persistence)?,
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        title,
        description,
        status,
        position,
        priority,
        assignee_id,
        created_by,
        due_date,
        tags,
        subtasks,
        attachments,
        comments_count,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        order: order_from_db(position)?,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        assignee: assignee_id.map(UserId::from_uuid),
        created_by: UserId::from_uuid(created_by),
        due_date,
        tags: serde_json::from_value(tags).map_err(TaskRepositoryError::persistence)?,
        subtasks: serde_json::from_value(subtasks).map_err(TaskRepositoryError::persistence)?,
        attachments: serde_json::from_value(attachments)
            .map_err(TaskRepositoryError::persistence)?,
        comments_count: u32::try_from(comments_count).map_err(TaskRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
