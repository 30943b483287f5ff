//! When steps for Kanban ordering BDD scenarios.

use super::world::{KanbanWorld, run_async};
use modulor::task::{
    domain::UserId,
    services::{Caller, CreateTaskRequest, ReorderTaskRequest},
};
use rstest_bdd_macros::when;

#[when(r#"task "{title}" is moved to "{status}" position {order}"#)]
fn move_task(
    world: &mut KanbanWorld,
    title: String,
    status: String,
    order: i64,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let result = run_async(world.service.reorder_task(
        world.owner,
        task_id,
        ReorderTaskRequest::new(status, order),
    ));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"an outsider moves task "{title}" to "{status}" position {order}"#)]
fn outsider_moves_task(
    world: &mut KanbanWorld,
    title: String,
    status: String,
    order: i64,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let outsider = Caller::new(UserId::new());
    let result = run_async(world.service.reorder_task(
        outsider,
        task_id,
        ReorderTaskRequest::new(status, order),
    ));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"task "{title}" is deleted"#)]
fn delete_task(world: &mut KanbanWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    run_async(world.service.delete_task(world.owner, task_id))?;
    world.tasks.remove(&title);
    Ok(())
}

#[when(r#"task "{title}" is created in "{status}""#)]
fn create_task(world: &mut KanbanWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title.clone()).with_status(status);
    let result = run_async(
        world
            .service
            .create_task(world.owner, world.project, request),
    );
    if let Ok(task) = &result {
        world.tasks.insert(title, task.clone());
    }
    world.last_result = Some(result);
    Ok(())
}
