//! Then steps for task synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use dayflow::task::ports::SnapshotStore;
use rstest_bdd_macros::then;

#[then("the collection holds {count:usize} tasks")]
fn collection_holds_n_tasks(world: &mut SyncWorld, count: usize) -> Result<(), eyre::Report> {
    let tasks = run_async(world.orchestrator.tasks());
    if tasks.len() != count {
        return Err(eyre::eyre!(
            "expected {count} tasks, found {}",
            tasks.len()
        ));
    }
    Ok(())
}

#[then(r#"the task "{title}" keeps its local title"#)]
fn task_keeps_local_title(world: &mut SyncWorld, title: String) -> Result<(), eyre::Report> {
    let tasks = run_async(world.orchestrator.tasks());
    if !tasks.iter().any(|task| task.title().as_str() == title) {
        return Err(eyre::eyre!("no task titled {title} in the collection"));
    }
    let conflicting = format!("{title} (remote)");
    if tasks
        .iter()
        .any(|task| task.title().as_str() == conflicting)
    {
        return Err(eyre::eyre!(
            "the remote copy of {title} overwrote the local record"
        ));
    }
    Ok(())
}

#[then("the collection is empty")]
fn collection_is_empty(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    let tasks = run_async(world.orchestrator.tasks());
    if !tasks.is_empty() {
        return Err(eyre::eyre!("expected an empty collection, found {} tasks", tasks.len()));
    }
    Ok(())
}

#[then(r#"the task "{title}" is still present"#)]
fn task_is_still_present(world: &mut SyncWorld, title: String) -> Result<(), eyre::Report> {
    let tasks = run_async(world.orchestrator.tasks());
    if !tasks.iter().any(|task| task.title().as_str() == title) {
        return Err(eyre::eyre!("task {title} was removed prematurely"));
    }
    Ok(())
}

#[then("the cloud store holds no snapshot")]
fn cloud_store_holds_no_snapshot(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    if run_async(world.cloud.load()).is_some() {
        return Err(eyre::eyre!(
            "the cloud store was written while cloud sync was disabled"
        ));
    }
    Ok(())
}

#[then("the cloud store snapshot matches the collection")]
fn cloud_snapshot_matches_collection(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    let tasks = run_async(world.orchestrator.tasks());
    let cloud = run_async(world.cloud.load())
        .ok_or_else(|| eyre::eyre!("the cloud store holds no snapshot after enabling sync"))?;
    if cloud.len() != tasks.len() {
        return Err(eyre::eyre!(
            "cloud snapshot has {} tasks, collection has {}",
            cloud.len(),
            tasks.len()
        ));
    }
    for task in &tasks {
        if !cloud.iter().any(|stored| stored.id() == task.id()) {
            return Err(eyre::eyre!(
                "task {} missing from the cloud snapshot",
                task.title()
            ));
        }
    }
    Ok(())
}
