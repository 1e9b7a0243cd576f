//! Time-bounded, rate-limited, audited access to the inference provider.

use super::rate_limit::{RateLimitError, RateLimiter};
use crate::enrichment::{
    domain::{
        AuditOutcome, AuditRecord, EnrichmentSubject, InferencePrompt, Suggestion,
        parse_suggestion,
    },
    ports::{AuditLog, Enricher, InferenceClient, InferenceError},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Upper bound on a single audit write. Writes run after `suggest` returns.
const AUDIT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Gateway limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Hard limit on one inference call.
    pub timeout: Duration,
    /// Calls admitted per window.
    pub rate_limit_calls: usize,
    /// Sliding window length.
    pub rate_limit_window: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            rate_limit_calls: 10,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

/// Wraps an [`InferenceClient`] with a rate limit, a hard timeout and an
/// audit trail. Provider replies are parsed before anything leaves the
/// gateway.
///
/// Audit writes are detached from [`Enricher::suggest`], so a slow audit
/// store never stretches an attempt past its timeout. [`Enricher::drain`]
/// waits for them.
pub struct EnrichmentGateway<I, A, C>
where
    I: InferenceClient + ?Sized,
    A: AuditLog + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    client: Arc<I>,
    audit: Arc<A>,
    clock: Arc<C>,
    limiter: RateLimiter,
    timeout: Duration,
    audits: TaskTracker,
}

enum Attempt {
    Parsed(Suggestion),
    RateLimited(Duration),
    TimedOut,
    Failed(InferenceError),
    Unparseable(String),
}

impl<I, A, C> EnrichmentGateway<I, A, C>
where
    I: InferenceClient + ?Sized,
    A: AuditLog + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a gateway with its own rate-limit window.
    #[must_use]
    pub fn new(client: Arc<I>, audit: Arc<A>, clock: Arc<C>, settings: GatewaySettings) -> Self {
        Self {
            client,
            audit,
            clock,
            limiter: RateLimiter::new(settings.rate_limit_calls, settings.rate_limit_window),
            timeout: settings.timeout,
            audits: TaskTracker::new(),
        }
    }

    async fn attempt(&self, subject: &EnrichmentSubject) -> Attempt {
        if let Err(err) = self.limiter.try_acquire() {
            let RateLimitError::Exceeded { retry_after } = err;
            return Attempt::RateLimited(retry_after);
        }

        let prompt = InferencePrompt::for_subject(subject);
        match tokio::time::timeout(self.timeout, self.client.complete(&prompt)).await {
            Err(_) => Attempt::TimedOut,
            Ok(Err(err)) => Attempt::Failed(err),
            Ok(Ok(reply)) => match parse_suggestion(&reply) {
                Ok(suggestion) => Attempt::Parsed(suggestion),
                Err(err) => Attempt::Unparseable(err.to_string()),
            },
        }
    }

    fn record(&self, record: AuditRecord) {
        let audit = Arc::clone(&self.audit);
        self.audits.spawn(async move {
            let task_id = record.task_id;
            match tokio::time::timeout(AUDIT_WRITE_TIMEOUT, audit.append(&record)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(task_id = %task_id, error = %err, "audit write failed"),
                Err(_) => warn!(task_id = %task_id, "audit write timed out"),
            }
        });
    }
}

#[async_trait]
impl<I, A, C> Enricher for EnrichmentGateway<I, A, C>
where
    I: InferenceClient + ?Sized,
    A: AuditLog + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    async fn suggest(&self, subject: &EnrichmentSubject) -> Option<Suggestion> {
        let started = Instant::now();
        let attempt = self.attempt(subject).await;
        let latency = started.elapsed();
        let task_id = subject.task_id();
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);

        let (outcome, detail, suggestion) = match attempt {
            Attempt::Parsed(suggestion) => {
                info!(
                    task_id = %task_id,
                    priority = suggestion.priority().as_str(),
                    hours = suggestion.duration().value(),
                    latency_ms,
                    "enrichment succeeded"
                );
                (AuditOutcome::Success, None, Some(suggestion))
            }
            Attempt::RateLimited(retry_after) => {
                warn!(task_id = %task_id, ?retry_after, "enrichment skipped: rate limited");
                (
                    AuditOutcome::Timeout,
                    Some("rate limited".to_owned()),
                    None,
                )
            }
            Attempt::TimedOut => {
                warn!(task_id = %task_id, latency_ms, "enrichment timed out");
                (
                    AuditOutcome::Timeout,
                    Some(format!("no reply within {}ms", self.timeout.as_millis())),
                    None,
                )
            }
            Attempt::Failed(err) => {
                if matches!(err, InferenceError::Unavailable(_)) {
                    debug!(task_id = %task_id, error = %err, "enrichment unavailable");
                } else {
                    error!(task_id = %task_id, error = %err, "enrichment call failed");
                }
                (AuditOutcome::Error, Some(err.to_string()), None)
            }
            Attempt::Unparseable(reason) => {
                warn!(task_id = %task_id, %reason, "enrichment reply rejected");
                (AuditOutcome::Error, Some(reason), None)
            }
        };

        let mut record = AuditRecord::new(subject, outcome, latency, &*self.clock);
        if let Some(text) = detail {
            record = record.with_detail(text);
        }
        self.record(record);
        suggestion
    }

    async fn drain(&self, grace: Duration) -> bool {
        self.audits.close();
        let drained = tokio::time::timeout(grace, self.audits.wait()).await.is_ok();
        self.audits.reopen();
        drained
    }
}
