//! When steps for task synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use chrono::Duration;
use rstest_bdd_macros::when;

#[when("the persisted snapshots are loaded")]
fn load_persisted_snapshots(world: &mut SyncWorld) {
    run_async(world.orchestrator.load());
}

#[when(r#"the task "{title}" is marked completed"#)]
fn mark_task_completed(world: &mut SyncWorld, title: String) -> Result<(), eyre::Report> {
    let id = world
        .ids_by_title
        .get(&title)
        .copied()
        .ok_or_else(|| eyre::eyre!("no task named {title} in the scenario world"))?;
    let mut task = run_async(world.orchestrator.tasks())
        .into_iter()
        .find(|task| task.id() == id)
        .ok_or_else(|| eyre::eyre!("task {title} absent from the collection"))?;
    task.mark_completed(&*world.clock);
    run_async(world.orchestrator.update(task)).map_err(|err| eyre::eyre!(err))?;
    Ok(())
}

#[when("{minutes:i64} minutes pass and a sweep runs")]
fn minutes_pass_and_sweep(world: &mut SyncWorld, minutes: i64) {
    world.clock.advance(Duration::minutes(minutes));
    world.last_swept = Some(run_async(world.orchestrator.sweep_once()));
}

#[when("cloud sync is enabled")]
fn enable_cloud_sync(world: &mut SyncWorld) {
    run_async(world.orchestrator.set_cloud_sync(true));
}
