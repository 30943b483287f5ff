//! Shared world state for Kanban ordering BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use modulor::task::{
    adapters::memory::{InMemoryProjectDirectory, InMemoryTaskRepository},
    domain::{PartitionKey, ProjectId, Task, TaskStatus, UserId},
    ports::TaskRepository,
    services::{Caller, TaskBoardService, TaskServiceError},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestBoardService =
    TaskBoardService<InMemoryTaskRepository, InMemoryProjectDirectory, DefaultClock>;

/// Scenario world for Kanban ordering behaviour tests.
pub struct KanbanWorld {
    pub service: TestBoardService,
    pub repository: Arc<InMemoryTaskRepository>,
    pub owner: Caller,
    pub project: ProjectId,
    pub tasks: HashMap<String, Task>,
    pub last_result: Option<Result<Task, TaskServiceError>>,
}

impl KanbanWorld {
    /// Creates a world holding one empty project owned by a fresh user.
    ///
    /// # Panics
    ///
    /// Panics if the project cannot be registered.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let directory = Arc::new(InMemoryProjectDirectory::new());
        let owner = Caller::new(UserId::new());
        let project = ProjectId::new();
        directory
            .add_project(project, owner.user_id())
            .expect("project registration should succeed");
        let service =
            TaskBoardService::new(Arc::clone(&repository), directory, Arc::new(DefaultClock));
        Self {
            service,
            repository,
            owner,
            project,
            tasks: HashMap::new(),
            last_result: None,
        }
    }

    /// Returns the task seeded or created under `title`.
    ///
    /// # Errors
    ///
    /// Returns an error when no task carries that title.
    pub fn task(&self, title: &str) -> Result<&Task, eyre::Report> {
        self.tasks
            .get(title)
            .ok_or_else(|| eyre::eyre!("no task titled {title} in scenario world"))
    }

    /// Returns the titles of `status`, top first.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is unknown or the lookup fails.
    pub fn column(&self, status: &str) -> Result<Vec<(String, u32)>, eyre::Report> {
        let key = PartitionKey::new(self.project, TaskStatus::try_from(status)?);
        let tasks = run_async(self.repository.find_by_partition(key))?;
        Ok(tasks
            .iter()
            .map(|task| (task.title().as_str().to_owned(), task.order().value()))
            .collect())
    }
}

impl Default for KanbanWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> KanbanWorld {
    KanbanWorld::default()
}

/// Splits a comma-separated list of task titles.
pub fn titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
