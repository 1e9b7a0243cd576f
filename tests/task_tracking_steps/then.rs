//! Then steps for task tracking BDD scenarios.

use std::time::Duration;

use super::world::{TrackerWorld, run_async};
use rstest_bdd_macros::then;
use taskwright::enrichment::domain::AuditOutcome;
use taskwright::enrichment::ports::AuditLog;
use taskwright::identity::services::CredentialError;
use taskwright::task::{
    domain::{Task, TaskDomainError, TaskPriority, TaskStatus},
    ports::TaskRepositoryError,
    services::{ListTasksRequest, TaskServiceError},
};

fn refetch(world: &TrackerWorld) -> Result<Task, eyre::Report> {
    let task = world.subject_task()?;
    let fetched = run_async(
        world
            .app()?
            .state
            .tasks
            .get_task(task.owner_id(), task.id()),
    )?;
    Ok(fetched)
}

#[then("the registration succeeds with an identity id")]
fn registration_succeeds(world: &TrackerWorld) -> Result<(), eyre::Report> {
    match world.registration.as_ref() {
        Some(Ok(identity)) => {
            eyre::ensure!(
                world.users.values().any(|id| *id == identity.id()),
                "registered identity was not recorded"
            );
            Ok(())
        }
        other => Err(eyre::eyre!("expected a registered identity, got {other:?}")),
    }
}

#[then("the login fails with invalid credentials")]
fn login_fails(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let result = world
        .login
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing login result"))?;
    if !matches!(result, Err(CredentialError::InvalidCredentials)) {
        return Err(eyre::eyre!("expected InvalidCredentials, got {result:?}"));
    }
    Ok(())
}

#[then("the login returns access and refresh tokens")]
fn login_returns_tokens(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let tokens = match world.login.as_ref() {
        Some(Ok(tokens)) => tokens,
        other => return Err(eyre::eyre!("expected a token pair, got {other:?}")),
    };
    eyre::ensure!(!tokens.access_token.is_empty(), "empty access token");
    eyre::ensure!(!tokens.refresh_token.is_empty(), "empty refresh token");
    eyre::ensure!(
        tokens.access_token != tokens.refresh_token,
        "access and refresh tokens must differ"
    );
    Ok(())
}

#[then("the task is pending with no AI suggestions")]
fn task_is_pending(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let task = match world.creation.as_ref() {
        Some(Ok(task)) => task,
        other => return Err(eyre::eyre!("expected a created task, got {other:?}")),
    };
    eyre::ensure!(
        task.status() == TaskStatus::Pending,
        "expected pending, found {}",
        task.status().as_str()
    );
    eyre::ensure!(task.ai_priority().is_none(), "AI priority already set");
    eyre::ensure!(
        task.ai_estimated_duration().is_none(),
        "AI duration already set"
    );
    Ok(())
}

#[then(r#"re-fetching the task shows AI priority "{priority}" and duration {hours:u16}"#)]
fn refetch_shows_suggestion(
    world: &TrackerWorld,
    priority: String,
    hours: u16,
) -> Result<(), eyre::Report> {
    let expected = TaskPriority::try_from(priority.as_str())
        .map_err(|err| eyre::eyre!("invalid expected priority in scenario: {err}"))?;
    let task = refetch(world)?;
    eyre::ensure!(
        task.ai_priority() == Some(expected),
        "expected AI priority {}, found {:?}",
        expected.as_str(),
        task.ai_priority()
    );
    eyre::ensure!(
        task.ai_estimated_duration().map(|d| d.value()) == Some(hours),
        "expected AI duration {hours}, found {:?}",
        task.ai_estimated_duration()
    );
    Ok(())
}

#[then("re-fetching the task shows no AI suggestions")]
fn refetch_shows_nothing(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let task = refetch(world)?;
    eyre::ensure!(
        task.ai_priority().is_none() && task.ai_estimated_duration().is_none(),
        "expected no AI suggestions, found {:?} / {:?}",
        task.ai_priority(),
        task.ai_estimated_duration()
    );
    Ok(())
}

#[then("the creation fails with a validation error")]
fn creation_fails(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let result = world
        .creation
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing creation result"))?;
    if !matches!(result, Err(TaskServiceError::Domain(TaskDomainError::EmptyTitle))) {
        return Err(eyre::eyre!("expected EmptyTitle, got {result:?}"));
    }
    Ok(())
}

#[then(r#""{email}" has {count:u64} tasks"#)]
fn user_has_tasks(world: &TrackerWorld, email: String, count: u64) -> Result<(), eyre::Report> {
    let owner = world.user(&email)?;
    let page = run_async(
        world
            .app()?
            .state
            .tasks
            .list_tasks(owner, ListTasksRequest::default()),
    )?;
    eyre::ensure!(
        page.total == count,
        "expected {count} tasks for {email}, found {}",
        page.total
    );
    Ok(())
}

#[then("the deletion fails as not found")]
fn deletion_not_found(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let result = world
        .deletion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing deletion result"))?;
    if !matches!(
        result,
        Err(TaskServiceError::Repository(TaskRepositoryError::NotFound(_)))
    ) {
        return Err(eyre::eyre!("expected NotFound, got {result:?}"));
    }
    Ok(())
}

#[then("the creation returned within {millis:u64} milliseconds")]
fn creation_was_fast(world: &TrackerWorld, millis: u64) -> Result<(), eyre::Report> {
    let elapsed = world
        .creation_elapsed
        .ok_or_else(|| eyre::eyre!("missing creation timing"))?;
    eyre::ensure!(
        elapsed < Duration::from_millis(millis),
        "creation took {elapsed:?}"
    );
    Ok(())
}

#[then("the enrichment audit records a timeout")]
fn audit_records_timeout(world: &TrackerWorld) -> Result<(), eyre::Report> {
    let task_id = world.subject_task()?.id();
    let records = run_async(world.app()?.audit.records_for_task(task_id))?;
    eyre::ensure!(
        records.len() == 1,
        "expected one audit record, found {}",
        records.len()
    );
    eyre::ensure!(
        records.iter().all(|record| record.outcome == AuditOutcome::Timeout),
        "expected a timeout outcome, found {records:?}"
    );
    Ok(())
}
