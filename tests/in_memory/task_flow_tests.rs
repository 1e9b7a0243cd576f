//! Task service flows through the wired services, including enrichment.

use std::collections::HashSet;
use std::time::Duration;

use crate::test_helpers::{HIGH_THREE_HOURS, PASSWORD, TestApp, test_config};
use rstest::rstest;
use taskwright::config::{CliArgs, Config, FileConfig, StorageKind};
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::enrichment::domain::AuditOutcome;
use taskwright::enrichment::ports::{AuditLog, InferenceError};
use taskwright::identity::{domain::IdentityId, services::RegisterRequest};
use taskwright::task::{
    domain::{TaskId, TaskPriority, TaskStatus},
    services::{CreateTaskRequest, ListTasksRequest, UpdateTaskRequest},
};

async fn registered(app: &TestApp, email: &str) -> IdentityId {
    app.state
        .credentials
        .register(RegisterRequest::new(email, PASSWORD))
        .await
        .expect("registration succeeds")
        .id()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn owner_is_immutable_under_update() {
    let app = TestApp::new(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).expect("app");
    let owner = registered(&app, "owner@x.com").await;
    let task = app
        .state
        .tasks
        .create_task(owner, CreateTaskRequest::new("Quarterly plan"))
        .await
        .expect("task created");

    let updated = app
        .state
        .tasks
        .update_task(
            owner,
            task.id(),
            UpdateTaskRequest::new()
                .with_title("Quarterly plan v2")
                .with_status(TaskStatus::InProgress),
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.owner_id(), owner);
    assert_eq!(updated.title().as_str(), "Quarterly plan v2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concatenated_pages_cover_every_task_once() {
    let app = TestApp::new(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).expect("app");
    let owner = registered(&app, "pager@x.com").await;
    let mut created = HashSet::new();
    for n in 0..7 {
        let task = app
            .state
            .tasks
            .create_task(owner, CreateTaskRequest::new(format!("task {n}")))
            .await
            .expect("task created");
        created.insert(task.id());
    }

    let mut seen: Vec<TaskId> = Vec::new();
    let mut offset = 0;
    loop {
        let page = app
            .state
            .tasks
            .list_tasks(
                owner,
                ListTasksRequest {
                    offset,
                    limit: Some(3),
                    ..ListTasksRequest::default()
                },
            )
            .await
            .expect("list succeeds");
        assert_eq!(page.total, 7);
        if page.tasks.is_empty() {
            break;
        }
        offset += u64::try_from(page.tasks.len()).expect("page length fits");
        seen.extend(page.tasks.iter().map(|task| task.id()));
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(seen.into_iter().collect::<HashSet<_>>(), created);
}

#[rstest]
#[case::provider_error(
    ScriptedInferenceClient::failing(InferenceError::Provider {
        status: 503,
        body: "busy".to_owned(),
    }),
    AuditOutcome::Error
)]
#[case::malformed(ScriptedInferenceClient::replying("no idea"), AuditOutcome::Error)]
#[case::out_of_range(
    ScriptedInferenceClient::replying(r#"{"priority": "high", "estimated_hours": 4000}"#),
    AuditOutcome::Error
)]
#[case::hang(ScriptedInferenceClient::hanging(), AuditOutcome::Timeout)]
#[tokio::test(flavor = "multi_thread")]
async fn failed_enrichment_leaves_ai_fields_null(
    #[case] client: ScriptedInferenceClient,
    #[case] expected: AuditOutcome,
) {
    let config = test_config(Duration::from_millis(100)).expect("config");
    let app = TestApp::with_config(&config, client);
    let owner = registered(&app, "fail@x.com").await;

    let task = app
        .state
        .tasks
        .create_task(owner, CreateTaskRequest::new("Unlucky task"))
        .await
        .expect("creation succeeds regardless of the provider");
    app.settle().await.expect("enrichment settles");

    let stored = app
        .state
        .tasks
        .get_task(owner, task.id())
        .await
        .expect("task exists");
    assert_eq!(stored.ai_priority(), None);
    assert_eq!(stored.ai_estimated_duration(), None);

    let records = app
        .audit
        .records_for_task(task.id())
        .await
        .expect("audit readable");
    assert_eq!(records.len(), 1);
    assert_eq!(records.first().map(|r| r.outcome), Some(expected));
    assert_eq!(records.first().map(|r| r.identity_id), Some(owner));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rate_limit_caps_provider_calls() {
    let cli = CliArgs {
        jwt_secret: Some(crate::test_helpers::JWT_SECRET.to_owned()),
        pbkdf2_iterations: Some(1_000),
        ..CliArgs::default()
    };
    let file: FileConfig =
        toml::from_str("[enrichment]\nrate_limit_calls = 2\nrate_limit_window_secs = 60")
            .expect("parse");
    let config = Config::resolve(&cli, file).expect("config");
    assert_eq!(config.storage.kind, StorageKind::Memory);
    let app = TestApp::with_config(&config, ScriptedInferenceClient::replying(HIGH_THREE_HOURS));
    let owner = registered(&app, "busy@x.com").await;

    for n in 0..4 {
        app.state
            .tasks
            .create_task(owner, CreateTaskRequest::new(format!("burst {n}")))
            .await
            .expect("task created");
    }
    app.settle().await.expect("enrichment settles");

    assert_eq!(app.client.call_count(), 2);
    let outcomes: Vec<AuditOutcome> = app
        .audit
        .all()
        .expect("audit readable")
        .into_iter()
        .map(|record| record.outcome)
        .collect();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(
        outcomes.iter().filter(|o| **o == AuditOutcome::Success).count(),
        2
    );
    assert_eq!(
        outcomes.iter().filter(|o| **o == AuditOutcome::Timeout).count(),
        2
    );

    let page = app
        .state
        .tasks
        .list_tasks(owner, ListTasksRequest::default())
        .await
        .expect("list succeeds");
    let enriched = page
        .tasks
        .iter()
        .filter(|task| task.ai_priority() == Some(TaskPriority::High))
        .count();
    assert_eq!(enriched, 2);
}
