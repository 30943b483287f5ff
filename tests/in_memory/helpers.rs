//! Shared test helpers for in-memory task board integration tests.

use std::sync::Arc;

use modulor::task::{
    adapters::memory::{InMemoryProjectDirectory, InMemoryTaskRepository, RecordingChangeSink},
    domain::{PartitionKey, ProjectId, Task, TaskStatus, UserId},
    ports::TaskRepository,
    services::{Caller, CreateTaskRequest, TaskBoardService},
};
use mockable::DefaultClock;
use rstest::fixture;
use tracing_subscriber::EnvFilter;

/// Service type under test.
pub type TestService =
    TaskBoardService<InMemoryTaskRepository, InMemoryProjectDirectory, DefaultClock>;

/// Service wired to fresh in-memory adapters, with one project owned by
/// `owner`.
pub struct BoardContext {
    /// Service under test.
    pub service: TestService,
    /// Repository behind the service, for direct inspection.
    pub repository: Arc<InMemoryTaskRepository>,
    /// Membership directory behind the service.
    pub directory: Arc<InMemoryProjectDirectory>,
    /// Sink receiving every committed change.
    pub sink: RecordingChangeSink,
    /// Project owner.
    pub owner: Caller,
    /// Project all tasks are created in.
    pub project: ProjectId,
}

/// Installs a test-writer tracing subscriber once per test binary.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .is_ok();
    tracing::trace!(installed, "test tracing ready");
}

/// Provides a fresh board context.
#[fixture]
pub fn context() -> BoardContext {
    init_tracing();
    let repository = Arc::new(InMemoryTaskRepository::new());
    let directory = Arc::new(InMemoryProjectDirectory::new());
    let sink = RecordingChangeSink::new();
    let owner = Caller::new(UserId::new());
    let project = ProjectId::new();
    directory
        .add_project(project, owner.user_id())
        .expect("project registration should succeed");
    let service = TaskBoardService::new(
        Arc::clone(&repository),
        Arc::clone(&directory),
        Arc::new(DefaultClock),
    )
    .with_change_sink(Arc::new(sink.clone()));
    BoardContext {
        service,
        repository,
        directory,
        sink,
        owner,
        project,
    }
}

impl BoardContext {
    /// Creates one task per title in `status`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any creation fails.
    pub async fn seed(&self, status: &str, titles: &[&str]) -> Result<Vec<Task>, eyre::Report> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            let task = self
                .service
                .create_task(
                    self.owner,
                    self.project,
                    CreateTaskRequest::new(*title).with_status(status),
                )
                .await?;
            created.push(task);
        }
        Ok(created)
    }

    /// Returns `(title, order)` pairs of a column, top first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository lookup fails.
    pub async fn layout(&self, status: TaskStatus) -> Result<Vec<(String, u32)>, eyre::Report> {
        let tasks = self
            .repository
            .find_by_partition(PartitionKey::new(self.project, status))
            .await?;
        Ok(tasks
            .iter()
            .map(|task| (task.title().as_str().to_owned(), task.order().value()))
            .collect())
    }

    /// Checks that every column holds positions `0..n` exactly.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first column that is not dense.
    pub async fn ensure_dense(&self) -> Result<(), eyre::Report> {
        for status in TaskStatus::ALL {
            let orders: Vec<u32> = self
                .layout(status)
                .await?
                .into_iter()
                .map(|(_, order)| order)
                .collect();
            let expected: Vec<u32> = (0_u32..).take(orders.len()).collect();
            eyre::ensure!(
                orders == expected,
                "column {status} is not dense: {orders:?}"
            );
        }
        Ok(())
    }
}

/// Builds an owned layout from borrowed pairs.
#[must_use]
pub fn layout_of(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
    pairs
        .iter()
        .map(|(title, order)| ((*title).to_owned(), *order))
        .collect()
}
