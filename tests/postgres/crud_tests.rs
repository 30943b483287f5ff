//! Store, lookup and field updates against `PostgreSQL`.

use super::helpers::{PreparedRepo, clock, new_task, repository};
use chrono::{Duration, TimeZone, Utc};
use mockable::DefaultClock;
use modulor::task::{
    domain::{
        Attachment, ProjectId, Subtask, TaskDetailsPatch, TaskPriority, TaskStatus, TaskTitle,
        UserId,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_task_round_trips_payload(
    repository: Result<PreparedRepo, eyre::Report>,
    clock: DefaultClock,
) -> Result<(), eyre::Report> {
    let PreparedRepo {
        repo,
        database: _database,
    } = repository?;
    let project = ProjectId::new();
    let mut task = new_task(&clock, project, TaskStatus::Todo, 0, "Persist me")?;
    let assignee = UserId::new();
    let due = Utc
        .with_ymd_and_hms(2026, 11, 2, 17, 0, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("invalid due date"))?;
    task.apply_details(
        TaskDetailsPatch {
            description: Some("Covers every JSONB column".to_owned()),
            priority: Some(TaskPriority::High),
            assignee: Some(Some(assignee)),
            due_date: Some(Some(due)),
            tags: Some(vec!["db".to_owned(), "ordering".to_owned()]),
            subtasks: Some(vec![Subtask::new("Write migration")?.completed()]),
            attachments: Some(vec![
                Attachment::new("https://files.example/brief.pdf", "brief.pdf", due)?
                    .with_file_type("application/pdf")
                    .with_file_size(2048),
            ]),
            ..TaskDetailsPatch::default()
        },
        &clock,
    );

    repo.store(&task).await?;
    let found = repo
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("stored task should be found"))?;

    assert_eq!(found.title(), task.title());
    assert_eq!(found.description(), "Covers every JSONB column");
    assert_eq!(found.priority(), TaskPriority::High);
    assert_eq!(found.assignee(), Some(assignee));
    assert_eq!(found.due_date(), Some(due));
    assert_eq!(found.tags(), task.tags());
    assert_eq!(found.subtasks(), task.subtasks());
    assert_eq!(found.attachments(), task.attachments());
    assert_eq!(found.placement(), task.placement());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_duplicate_identifier(
    repository: Result<PreparedRepo, eyre::Report>,
    clock: DefaultClock,
) -> Result<(), eyre::Report> {
    let PreparedRepo {
        repo,
        database: _database,
    } = repository?;
    let task = new_task(&clock, ProjectId::new(), TaskStatus::Todo, 0, "Once")?;
    repo.store(&task).await?;

    let result = repo.store(&task).await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_position_other_than_column_size(
    repository: Result<PreparedRepo, eyre::Report>,
    clock: DefaultClock,
) -> Result<(), eyre::Report> {
    let PreparedRepo {
        repo,
        database: _database,
    } = repository?;
    let project = ProjectId::new();
    repo.store(&new_task(&clock, project, TaskStatus::Done, 0, "First")?)
        .await?;

    let stale = new_task(&clock, project, TaskStatus::Done, 0, "Also first")?;
    let result = repo.store(&stale).await;

    assert!(matches!(result, Err(TaskRepositoryError::Conflict(key)) if key == stale.partition()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_never_moves_the_task(
    repository: Result<PreparedRepo, eyre::Report>,
    clock: DefaultClock,
) -> Result<(), eyre::Report> {
    let PreparedRepo {
        repo,
        database: _database,
    } = repository?;
    let project = ProjectId::new();
    let task = new_task(&clock, project, TaskStatus::InProgress, 0, "Original")?;
    repo.store(&task).await?;

    let mut renamed = task.clone();
    renamed.apply_details(
        TaskDetailsPatch {
            title: Some(TaskTitle::new("Renamed")?),
            ..TaskDetailsPatch::default()
        },
        &clock,
    );
    repo.update(&renamed).await?;
    let found = repo
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;

    assert_eq!(found.title().as_str(), "Renamed");
    assert_eq!(found.placement(), task.placement());
    assert!(found.updated_at() >= task.updated_at() - Duration::microseconds(1));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_counter_saturates_at_zero(
    repository: Result<PreparedRepo, eyre::Report>,
    clock: DefaultClock,
) -> Result<(), eyre::Report> {
    let PreparedRepo {
        repo,
        database: _database,
    } = repository?;
    let task = new_task(&clock, ProjectId::new(), TaskStatus::Todo, 0, "Chatty")?;
    repo.store(&task).await?;

    let raised = repo.adjust_comments_count(task.id(), 3).await?;
    let lowered = repo.adjust_comments_count(task.id(), -10).await?;
    let missing = repo
        .adjust_comments_count(modulor::task::domain::TaskId::new(), 1)
        .await;

    assert_eq!(raised.comments_count(), 3);
    assert_eq!(lowered.comments_count(), 0);
    assert!(matches!(missing, Err(TaskRepositoryError::NotFound(_))));
    Ok(())
}
