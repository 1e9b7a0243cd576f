//! Given steps for task tracking BDD scenarios.

use std::time::Duration;

use super::world::{TrackerWorld, run_async};
use crate::test_helpers::{PASSWORD, TestApp, test_config};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::identity::services::RegisterRequest;
use taskwright::task::services::CreateTaskRequest;

#[given(r#"a tracker whose provider suggests "{priority}" for {hours:u16} hours"#)]
fn tracker_with_suggestion(
    world: &mut TrackerWorld,
    priority: String,
    hours: u16,
) -> Result<(), eyre::Report> {
    let reply = json!({ "priority": priority, "estimated_hours": hours }).to_string();
    world.app = Some(TestApp::new(ScriptedInferenceClient::replying(reply))?);
    Ok(())
}

#[given("a tracker whose provider never answers and times out after {millis:u64} milliseconds")]
fn tracker_with_hanging_provider(
    world: &mut TrackerWorld,
    millis: u64,
) -> Result<(), eyre::Report> {
    let config = test_config(Duration::from_millis(millis))?;
    world.app = Some(TestApp::with_config(
        &config,
        ScriptedInferenceClient::hanging(),
    ));
    Ok(())
}

#[given(r#"a registered user "{email}""#)]
fn registered_user(world: &mut TrackerWorld, email: String) -> Result<(), eyre::Report> {
    let identity = run_async(
        world
            .app()?
            .state
            .credentials
            .register(RegisterRequest::new(email.as_str(), PASSWORD)),
    )
    .wrap_err("register scenario user")?;
    world.users.insert(email, identity.id());
    Ok(())
}

#[given(r#""{email}" owns a task titled "{title}""#)]
fn user_owns_task(
    world: &mut TrackerWorld,
    email: String,
    title: String,
) -> Result<(), eyre::Report> {
    let owner = world.user(&email)?;
    let app = world.app()?;
    let task = run_async(
        app.state
            .tasks
            .create_task(owner, CreateTaskRequest::new(title)),
    )
    .wrap_err("create scenario task")?;
    run_async(app.settle())?;
    world.subject_task = Some(task);
    Ok(())
}
