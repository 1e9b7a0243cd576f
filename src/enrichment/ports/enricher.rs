//! Port through which the task service requests suggestions.

use crate::enrichment::domain::{EnrichmentSubject, Suggestion};
use async_trait::async_trait;
use std::time::Duration;

/// Produces a best-effort suggestion for a task.
///
/// Implementations never fail: every problem is reported as `None`.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Returns a suggestion, or `None` when none could be produced.
    async fn suggest(&self, subject: &EnrichmentSubject) -> Option<Suggestion>;

    /// Waits up to `grace` for bookkeeping that outlives [`Self::suggest`],
    /// such as audit writes.
    ///
    /// Returns `true` when nothing is left running.
    async fn drain(&self, grace: Duration) -> bool;
}
