//! Then steps for Kanban ordering BDD scenarios.

use super::world::{KanbanWorld, run_async, titles};
use modulor::task::{domain::TaskStatus, services::TaskServiceError};
use rstest_bdd_macros::then;

#[then(r#"the "{status}" column reads "{list}""#)]
fn column_reads(world: &KanbanWorld, status: String, list: String) -> Result<(), eyre::Report> {
    let expected: Vec<(String, u32)> = titles(&list).into_iter().zip(0_u32..).collect();
    let actual = world.column(&status)?;
    eyre::ensure!(
        actual == expected,
        "expected {status} column {expected:?}, found {actual:?}"
    );
    Ok(())
}

#[then(r#"task "{title}" sits at position {order:u32} of "{status}""#)]
fn task_sits_at(
    world: &KanbanWorld,
    title: String,
    order: u32,
    status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let task = run_async(world.service.get_task(world.owner, task_id))?;
    eyre::ensure!(
        task.status().as_str() == status && task.order().value() == order,
        "expected {title} at {status}#{order}, found {}",
        task.placement()
    );
    Ok(())
}

#[then("every column is dense")]
fn every_column_is_dense(world: &KanbanWorld) -> Result<(), eyre::Report> {
    for status in TaskStatus::ALL {
        let orders: Vec<u32> = world
            .column(status.as_str())?
            .into_iter()
            .map(|(_, order)| order)
            .collect();
        let expected: Vec<u32> = (0_u32..).take(orders.len()).collect();
        eyre::ensure!(orders == expected, "column {status} has gaps: {orders:?}");
    }
    Ok(())
}

#[then(r#"task "{title}" was not touched"#)]
fn task_not_touched(world: &KanbanWorld, title: String) -> Result<(), eyre::Report> {
    let before = world.task(&title)?;
    let after = run_async(world.service.get_task(world.owner, before.id()))?;
    eyre::ensure!(
        &after == before,
        "expected {title} to be unchanged, found {after:?}"
    );
    Ok(())
}

#[then("the move is forbidden")]
fn move_is_forbidden(world: &KanbanWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result in scenario world"))?;
    eyre::ensure!(
        matches!(result, Err(TaskServiceError::Forbidden { .. })),
        "expected forbidden error, got {result:?}"
    );
    Ok(())
}
