//! Audit trail persistence against `PostgreSQL`.

use std::time::Duration;

use super::helpers::harness;
use crate::test_helpers::HIGH_THREE_HOURS;
use mockable::DefaultClock;
use rstest::rstest;
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::enrichment::domain::{AuditOutcome, AuditRecord, EnrichmentSubject};
use taskwright::identity::domain::IdentityId;
use taskwright::task::domain::TaskId;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn records_are_returned_per_task_in_order() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let subject = EnrichmentSubject::new(IdentityId::new(), TaskId::new(), "Audit me");
    let first = AuditRecord::new(
        &subject,
        AuditOutcome::Timeout,
        Duration::from_millis(3_000),
        &DefaultClock,
    )
    .with_detail("rate limited");
    let second = AuditRecord::new(
        &subject,
        AuditOutcome::Success,
        Duration::from_millis(420),
        &DefaultClock,
    );

    pg.backends.audit.append(&first).await?;
    pg.backends.audit.append(&second).await?;
    let records = pg.backends.audit.records_for_task(subject.task_id()).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records.first().map(|r| r.outcome), Some(AuditOutcome::Timeout));
    assert_eq!(
        records.first().and_then(|r| r.detail.as_deref()),
        Some("rate limited")
    );
    assert_eq!(records.get(1).map(|r| r.latency_ms), Some(420));
    Ok(())
}
