//! Task persistence against `PostgreSQL`.

use std::collections::HashSet;

use super::helpers::harness;
use crate::test_helpers::{GRACE, HIGH_THREE_HOURS};
use chrono::Utc;
use rstest::rstest;
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::task::{
    domain::{DurationHours, TaskId, TaskPriority, TaskStatus},
    ports::TaskRepositoryError,
    services::{CreateTaskRequest, ListTasksRequest, TaskServiceError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn enrichment_is_written_and_survives_user_updates() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let owner = pg.register().await?;
    let tasks = &pg.state.tasks;

    let task = tasks
        .create_task(
            owner,
            CreateTaskRequest::new("Write report").with_description("Q4 summary"),
        )
        .await?;
    assert!(tasks.wait_for_enrichment(GRACE).await);

    let updated = tasks
        .update_task(
            owner,
            task.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::Completed),
        )
        .await?;

    assert_eq!(updated.ai_priority(), Some(TaskPriority::High));
    assert_eq!(updated.ai_estimated_duration().map(|d| d.value()), Some(3));
    assert!(updated.completed_at().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn other_owner_cannot_see_update_or_delete() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let alice = pg.register().await?;
    let bob = pg.register().await?;
    let tasks = &pg.state.tasks;
    let task = tasks
        .create_task(bob, CreateTaskRequest::new("Private plan"))
        .await?;

    let get = tasks.get_task(alice, task.id()).await;
    let update = tasks
        .update_task(alice, task.id(), UpdateTaskRequest::new().with_title("Mine"))
        .await;
    let delete = tasks.delete_task(alice, task.id()).await;

    for result in [get.map(|_| ()), update.map(|_| ()), delete] {
        assert!(matches!(
            result,
            Err(TaskServiceError::Repository(TaskRepositoryError::NotFound(_)))
        ));
    }
    assert_eq!(tasks.get_task(bob, task.id()).await?.title().as_str(), "Private plan");
    assert!(tasks.wait_for_enrichment(GRACE).await);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn pages_filters_and_totals_are_consistent() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let owner = pg.register().await?;
    let tasks = &pg.state.tasks;
    let mut urgent = HashSet::new();
    for n in 0..5 {
        let task = tasks
            .create_task(
                owner,
                CreateTaskRequest::new(format!("urgent {n}")).with_priority(TaskPriority::Urgent),
            )
            .await?;
        urgent.insert(task.id());
    }
    tasks
        .create_task(owner, CreateTaskRequest::new("someday"))
        .await?;

    let mut seen: Vec<TaskId> = Vec::new();
    let mut offset = 0;
    loop {
        let page = tasks
            .list_tasks(
                owner,
                ListTasksRequest {
                    priority: Some(TaskPriority::Urgent),
                    offset,
                    limit: Some(2),
                    ..ListTasksRequest::default()
                },
            )
            .await?;
        assert_eq!(page.total, 5);
        if page.tasks.is_empty() {
            break;
        }
        offset += u64::try_from(page.tasks.len())?;
        seen.extend(page.tasks.iter().map(|task| task.id()));
    }

    assert_eq!(seen.len(), 5);
    assert_eq!(seen.into_iter().collect::<HashSet<_>>(), urgent);
    assert!(tasks.wait_for_enrichment(GRACE).await);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn ai_update_on_deleted_task_is_a_no_op() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::hanging()).await?;
    let owner = pg.register().await?;
    let task = pg
        .state
        .tasks
        .create_task(owner, CreateTaskRequest::new("Short lived"))
        .await?;
    pg.state.tasks.delete_task(owner, task.id()).await?;

    let result = pg
        .backends
        .tasks
        .update_ai_suggestions(
            task.id(),
            TaskPriority::Low,
            DurationHours::new(1)?,
            Utc::now(),
        )
        .await?;

    assert!(result.is_none());
    Ok(())
}
