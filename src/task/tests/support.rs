//! Task builders shared by the unit tests.

use crate::task::{
    domain::{
        PartitionKey, PersistedTaskData, ProjectId, Task, TaskOrder, TaskPriority, TaskStatus,
        TaskTitle, UserId,
    },
    ordering::{PartitionSnapshot, RemovalPlan, ShiftPlan},
};
use chrono::{TimeZone, Utc};

/// Builds a stored task at `order` in `(project, status)`.
pub(super) fn stored_task(project: ProjectId, status: TaskStatus, order: u32, title: &str) -> Task {
    let timestamp = Utc
        .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Task::from_persisted(PersistedTaskData {
        id: crate::task::domain::TaskId::new(),
        project_id: project,
        title: TaskTitle::new(title).expect("valid title"),
        description: String::new(),
        status,
        order: TaskOrder::new(order),
        priority: TaskPriority::default(),
        assignee: None,
        created_by: UserId::new(),
        due_date: None,
        tags: Vec::new(),
        subtasks: Vec::new(),
        attachments: Vec::new(),
        comments_count: 0,
        created_at: timestamp,
        updated_at: timestamp,
    })
}

/// Builds a column holding one task per title, in title order.
pub(super) fn column(project: ProjectId, status: TaskStatus, titles: &[&str]) -> Vec<Task> {
    titles
        .iter()
        .zip(0_u32..)
        .map(|(title, order)| stored_task(project, status, order, title))
        .collect()
}

/// Captures the snapshot of `status` among `tasks`.
pub(super) fn snapshot(tasks: &[Task], project: ProjectId, status: TaskStatus) -> PartitionSnapshot {
    let key = PartitionKey::new(project, status);
    PartitionSnapshot::capture(key, tasks.iter().filter(|task| task.partition() == key))
}

/// Applies a move plan to an in-process board, as a repository would.
pub(super) fn commit_move(tasks: &mut [Task], plan: &ShiftPlan) {
    for shift in plan.shifts() {
        if let Some(task) = tasks.iter_mut().find(|task| task.id() == shift.task_id) {
            task.shift_to(shift.to);
        }
    }
    let moved = plan.moved();
    if let Some(task) = tasks.iter_mut().find(|task| task.id() == moved.task_id) {
        task.relocate(moved.to, plan.moved_at());
    }
}

/// Applies a removal plan to an in-process board, as a repository would.
pub(super) fn commit_removal(tasks: &mut Vec<Task>, plan: &RemovalPlan) {
    tasks.retain(|task| task.id() != plan.task_id());
    for shift in plan.shifts() {
        if let Some(task) = tasks.iter_mut().find(|task| task.id() == shift.task_id) {
            task.shift_to(shift.to);
        }
    }
}

/// Returns the titles of `status` among `tasks`, sorted by position, paired
/// with their positions.
pub(super) fn layout(tasks: &[Task], status: TaskStatus) -> Vec<(String, u32)> {
    let mut column: Vec<&Task> = tasks.iter().filter(|task| task.status() == status).collect();
    column.sort_by_key(|task| task.order());
    column
        .into_iter()
        .map(|task| (task.title().as_str().to_owned(), task.order().value()))
        .collect()
}

/// Finds the task titled `title`.
pub(super) fn by_title<'a>(tasks: &'a [Task], title: &str) -> &'a Task {
    tasks
        .iter()
        .find(|task| task.title().as_str() == title)
        .expect("task with title should exist")
}
