//! When steps for task tracking BDD scenarios.

use std::time::Instant;

use super::world::{TrackerWorld, run_async};
use rstest_bdd_macros::when;
use taskwright::identity::services::RegisterRequest;
use taskwright::task::services::CreateTaskRequest;

#[when(r#""{email}" registers with password "{password}""#)]
fn register(world: &mut TrackerWorld, email: String, password: String) -> Result<(), eyre::Report> {
    let result = run_async(
        world
            .app()?
            .state
            .credentials
            .register(RegisterRequest::new(email.as_str(), password)),
    );
    if let Ok(ref identity) = result {
        world.users.insert(email, identity.id());
    }
    world.registration = Some(result);
    Ok(())
}

#[when(r#""{email}" logs in with password "{password}""#)]
fn log_in(world: &mut TrackerWorld, email: String, password: String) -> Result<(), eyre::Report> {
    let credentials = &world.app()?.state.credentials;
    let result = run_async(credentials.authenticate(&email, &password))
        .and_then(|identity| credentials.issue_token(&identity));
    world.login = Some(result);
    Ok(())
}

fn create(
    world: &mut TrackerWorld,
    email: &str,
    request: CreateTaskRequest,
) -> Result<(), eyre::Report> {
    let owner = world.user(email)?;
    let started = Instant::now();
    let result = run_async(world.app()?.state.tasks.create_task(owner, request));
    world.creation_elapsed = Some(started.elapsed());
    if let Ok(ref task) = result {
        world.subject_task = Some(task.clone());
    }
    world.creation = Some(result);
    Ok(())
}

#[when(r#""{email}" creates a task titled "{title}" described as "{description}""#)]
fn create_described_task(
    world: &mut TrackerWorld,
    email: String,
    title: String,
    description: String,
) -> Result<(), eyre::Report> {
    create(
        world,
        &email,
        CreateTaskRequest::new(title).with_description(description),
    )
}

#[when(r#""{email}" creates a task with an empty title"#)]
fn create_untitled_task(world: &mut TrackerWorld, email: String) -> Result<(), eyre::Report> {
    create(world, &email, CreateTaskRequest::new(""))
}

#[when(r#""{email}" deletes that task"#)]
fn delete_task(world: &mut TrackerWorld, email: String) -> Result<(), eyre::Report> {
    let caller = world.user(&email)?;
    let task_id = world.subject_task()?.id();
    let result = run_async(world.app()?.state.tasks.delete_task(caller, task_id));
    world.deletion = Some(result);
    Ok(())
}

#[when("background enrichment finishes")]
fn enrichment_finishes(world: &mut TrackerWorld) -> Result<(), eyre::Report> {
    run_async(world.app()?.settle())
}
