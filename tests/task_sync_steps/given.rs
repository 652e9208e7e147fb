//! Given steps for task synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use dayflow::task::domain::{SyncSettings, Task, TaskTitle};
use dayflow::task::ports::{SettingsStore, SnapshotStore};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a local snapshot with tasks "{first}" and "{second}""#)]
fn local_snapshot_with_tasks(
    world: &mut SyncWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let first_task = Task::with_title(first.as_str()).wrap_err("construct first local task")?;
    let second_task = Task::with_title(second.as_str()).wrap_err("construct second local task")?;
    world.ids_by_title.insert(first, first_task.id());
    world.ids_by_title.insert(second, second_task.id());
    run_async(world.local.save(&[first_task, second_task]))
        .wrap_err("seed the local snapshot")?;
    Ok(())
}

#[given(r#"a cloud snapshot with a conflicting copy of "{shared}" and a task "{extra}""#)]
fn cloud_snapshot_with_conflict(
    world: &mut SyncWorld,
    shared: String,
    extra: String,
) -> Result<(), eyre::Report> {
    let shared_id = world
        .ids_by_title
        .get(&shared)
        .copied()
        .ok_or_else(|| eyre::eyre!("no local task named {shared} in the scenario world"))?;
    let local_tasks = run_async(world.local.load())
        .ok_or_else(|| eyre::eyre!("local snapshot missing from the scenario world"))?;
    let mut conflicting = local_tasks
        .into_iter()
        .find(|task| task.id() == shared_id)
        .ok_or_else(|| eyre::eyre!("shared task absent from the local snapshot"))?;
    conflicting.rename(
        TaskTitle::new(format!("{shared} (remote)")).wrap_err("construct conflicting title")?,
    );

    let extra_task = Task::with_title(extra.as_str()).wrap_err("construct cloud-only task")?;
    world.ids_by_title.insert(extra, extra_task.id());
    run_async(world.cloud.save(&[conflicting, extra_task]))
        .wrap_err("seed the cloud snapshot")?;
    Ok(())
}

#[given("cloud sync is enabled in the persisted preferences")]
fn cloud_sync_enabled_in_preferences(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    let settings = SyncSettings {
        cloud_sync_enabled: true,
        ..SyncSettings::default()
    };
    run_async(world.preferences.save(&settings)).wrap_err("persist enabled preferences")?;
    Ok(())
}

#[given(r#"an incomplete task "{title}" with no due date"#)]
fn incomplete_unscheduled_task(world: &mut SyncWorld, title: String) -> Result<(), eyre::Report> {
    let task = Task::with_title(title.as_str()).wrap_err("construct unscheduled task")?;
    world.ids_by_title.insert(title, task.id());
    run_async(world.orchestrator.add(task)).wrap_err("add task to the orchestrator")?;
    Ok(())
}
