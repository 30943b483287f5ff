//! Concurrent placement changes racing over several pooled connections.

use super::helpers::{PreparedRepo, TemporaryDatabase, clock, new_task, repository};
use chrono::Utc;
use mockable::DefaultClock;
use modulor::task::{
    adapters::{memory::InMemoryProjectDirectory, postgres::PostgresTaskRepository},
    domain::{PartitionKey, ProjectId, Task, TaskStatus, UserId},
    ordering::{MoveTarget, PartitionSnapshot, plan_move},
    ports::TaskRepository,
    services::{
        Caller, CreateTaskRequest, ReorderTaskRequest, TaskBoardService, TaskServiceConfig,
    },
};
use rstest::{fixture, rstest};
use std::sync::Arc;
use tokio::task::JoinSet;

const COLUMNS: [&str; 3] = ["todo", "in_progress", "done"];

type PgService = TaskBoardService<PostgresTaskRepository, InMemoryProjectDirectory, DefaultClock>;

/// Service over a private database, with one project owned by `owner`.
struct PgBoard {
    service: PgService,
    repo: PostgresTaskRepository,
    owner: Caller,
    project: ProjectId,
    _database: TemporaryDatabase,
}

impl PgBoard {
    async fn seed(&self, status: &str, titles: &[&str]) -> Result<Vec<Task>, eyre::Report> {
        let mut seeded = Vec::with_capacity(titles.len());
        for title in titles {
            seeded.push(
                self.service
                    .create_task(
                        self.owner,
                        self.project,
                        CreateTaskRequest::new(*title).with_status(status),
                    )
                    .await?,
            );
        }
        Ok(seeded)
    }

    async fn ensure_dense(&self) -> Result<usize, eyre::Report> {
        let mut total = 0;
        for status in TaskStatus::ALL {
            let key = PartitionKey::new(self.project, status);
            let tasks = self.repo.find_by_partition(key).await?;
            if !PartitionSnapshot::capture(key, &tasks).is_dense() {
                return Err(eyre::eyre!("column {key} has gaps or duplicates"));
            }
            total += tasks.len();
        }
        Ok(total)
    }
}

#[fixture]
fn board(repository: Result<PreparedRepo, eyre::Report>) -> Result<PgBoard, eyre::Report> {
    let PreparedRepo { repo, database } = repository?;
    let directory = Arc::new(InMemoryProjectDirectory::new());
    let owner = Caller::new(UserId::new());
    let project = ProjectId::new();
    directory.add_project(project, owner.user_id())?;
    let service = TaskBoardService::new(
        Arc::new(repo.clone()),
        directory,
        Arc::new(DefaultClock),
    )
    .with_config(TaskServiceConfig::default().with_max_commit_attempts(64));
    Ok(PgBoard {
        service,
        repo,
        owner,
        project,
        _database: database,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn plans_from_one_snapshot_commit_once(
    repository: Result<PreparedRepo, eyre::Report>,
    clock: DefaultClock,
) -> Result<(), eyre::Report> {
    let PreparedRepo {
        repo,
        database: _database,
    } = repository?;
    let project = ProjectId::new();
    let mut seeded = Vec::new();
    for (title, order) in ["A", "B", "C"].into_iter().zip(0_u32..) {
        let task = new_task(&clock, project, TaskStatus::Todo, order, title)?;
        repo.store(&task).await?;
        seeded.push(task);
    }
    let [a, _, c] = seeded.as_slice() else {
        return Err(eyre::eyre!("expected three tasks"));
    };
    let key = PartitionKey::new(project, TaskStatus::Todo);
    let source = PartitionSnapshot::capture(key, &repo.find_by_partition(key).await?);

    let sink_a = plan_move(a, &source, None, MoveTarget::new(TaskStatus::Todo, 2), Utc::now())?;
    let raise_c = plan_move(c, &source, None, MoveTarget::new(TaskStatus::Todo, 0), Utc::now())?;
    let (first, second) = tokio::join!(repo.apply_shift(&sink_a), repo.apply_shift(&raise_c));

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|outcome| outcome.as_ref().is_err_and(|err| err.is_conflict()))
    );
    let after = repo.find_by_partition(key).await?;
    assert!(PartitionSnapshot::capture(key, &after).is_dense());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_keep_every_column_dense(
    board: Result<PgBoard, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = board?;
    let seeded = board
        .seed("todo", &["A", "B", "C", "D", "E", "F", "G", "H"])
        .await?;

    let mut moves = JoinSet::new();
    for (round, task) in seeded.iter().cycle().take(32).enumerate() {
        let service = board.service.clone();
        let caller = board.owner;
        let task_id = task.id();
        let status = COLUMNS.iter().cycle().nth(round).copied().unwrap_or("todo");
        let order = i64::try_from(round).unwrap_or(i64::MAX) - 4;
        moves.spawn(async move {
            service
                .reorder_task(caller, task_id, ReorderTaskRequest::new(status, order))
                .await
        });
    }
    while let Some(joined) = moves.join_next().await {
        joined??;
    }

    assert_eq!(board.ensure_dense().await?, seeded.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_share_a_slot(
    board: Result<PgBoard, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = board?;

    let mut creates = JoinSet::new();
    for index in 0..16 {
        let service = board.service.clone();
        let caller = board.owner;
        let project = board.project;
        creates.spawn(async move {
            service
                .create_task(caller, project, CreateTaskRequest::new(format!("Task {index}")))
                .await
        });
    }
    while let Some(joined) = creates.join_next().await {
        joined??;
    }

    assert_eq!(board.ensure_dense().await?, 16);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deletes_and_moves_leave_no_gaps(
    board: Result<PgBoard, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = board?;
    let seeded = board
        .seed("in_progress", &["A", "B", "C", "D", "E", "F"])
        .await?;

    let mut work = JoinSet::new();
    for task in &seeded {
        let service = board.service.clone();
        let caller = board.owner;
        let task_id = task.id();
        let delete = matches!(task.title().as_str(), "A" | "C" | "E");
        work.spawn(async move {
            if delete {
                service.delete_task(caller, task_id).await
            } else {
                service
                    .reorder_task(caller, task_id, ReorderTaskRequest::new("done", 0))
                    .await
                    .map(|_| ())
            }
        });
    }
    while let Some(joined) = work.join_next().await {
        joined??;
    }

    assert_eq!(board.ensure_dense().await?, 3);
    let done = board
        .repo
        .find_by_partition(PartitionKey::new(board.project, TaskStatus::Done))
        .await?;
    assert_eq!(done.len(), 3);
    Ok(())
}
