//! Shared helpers for `PostgreSQL` adapter tests.

use std::sync::Arc;
use std::time::Duration;

use crate::test_helpers::{PASSWORD, test_config};
use taskwright::api::AppState;
use taskwright::app::{Backends, PgPool, build_state, connect_postgres};
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::identity::{domain::IdentityId, services::RegisterRequest};
use uuid::Uuid;

/// Environment variable naming the test database.
pub const DATABASE_URL_VAR: &str = "TASKWRIGHT_TEST_DATABASE_URL";

/// Services wired over `PostgreSQL`.
pub struct PgHarness {
    /// Shared pool.
    pub pool: PgPool,
    /// Adapters built on the pool.
    pub backends: Backends,
    /// Services built on the adapters.
    pub state: Arc<AppState>,
}

impl PgHarness {
    /// Registers a fresh identity with a unique email.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn register(&self) -> eyre::Result<IdentityId> {
        let identity = self
            .state
            .credentials
            .register(RegisterRequest::new(unique_email(), PASSWORD))
            .await?;
        Ok(identity.id())
    }
}

/// Email no other test run uses.
#[must_use]
pub fn unique_email() -> String {
    format!("{}@pg.taskwright.test", Uuid::new_v4().simple())
}

/// Connects to the test database and applies the schema.
///
/// # Errors
///
/// Returns an error if [`DATABASE_URL_VAR`] is unset or the database is
/// unreachable.
pub async fn harness(client: ScriptedInferenceClient) -> eyre::Result<PgHarness> {
    let url = std::env::var(DATABASE_URL_VAR)
        .map_err(|err| eyre::eyre!("{DATABASE_URL_VAR} must name a test database: {err}"))?;
    let pool = connect_postgres(&url, 4, true)
        .await
        .map_err(|err| eyre::eyre!("{err:#}"))?;
    let backends = Backends::postgres(&pool);
    let config = test_config(Duration::from_secs(3))?;
    let state = build_state(&config, backends.clone(), Arc::new(client));
    Ok(PgHarness {
        pool,
        backends,
        state,
    })
}
