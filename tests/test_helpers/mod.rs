//! Shared application harness for integration tests.
//!
//! Builds the full service graph over in-memory adapters with a scripted
//! inference provider and drives the router in-process.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use taskwright::api::{AppState, router};
use taskwright::app::{Backends, build_state};
use taskwright::config::{CliArgs, Config, FileConfig};
use taskwright::enrichment::adapters::{memory::InMemoryAuditLog, scripted::ScriptedInferenceClient};
use taskwright::identity::adapters::memory::InMemoryIdentityRepository;
use taskwright::task::adapters::memory::InMemoryTaskRepository;
use tower::ServiceExt;

/// Password accepted by the default policy.
pub const PASSWORD: &str = "Str0ngPassw0rd!";

/// Token secret long enough for the production check.
pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Upper bound on waiting for background enrichment.
pub const GRACE: Duration = Duration::from_secs(5);

/// Provider reply that parses to `high` and three hours.
pub const HIGH_THREE_HOURS: &str = r#"{"priority": "high", "estimated_hours": 3}"#;

/// Resolves a configuration suitable for tests.
///
/// The PBKDF2 work factor is lowered to keep registration fast and the
/// inference timeout is `timeout`.
///
/// # Errors
///
/// Returns an error if the configuration does not resolve.
pub fn test_config(timeout: Duration) -> eyre::Result<Config> {
    let cli = CliArgs {
        jwt_secret: Some(JWT_SECRET.to_owned()),
        pbkdf2_iterations: Some(1_000),
        enrichment_timeout_ms: Some(u64::try_from(timeout.as_millis())?),
        ..CliArgs::default()
    };
    Ok(Config::resolve(&cli, FileConfig::default())?)
}

/// A fully wired application over in-memory storage.
pub struct TestApp {
    /// Router under test.
    pub router: Router,
    /// Services behind the router.
    pub state: Arc<AppState>,
    /// Audit trail written by the enrichment gateway.
    pub audit: Arc<InMemoryAuditLog>,
    /// Scripted inference provider.
    pub client: Arc<ScriptedInferenceClient>,
}

impl TestApp {
    /// Builds an application whose provider behaves like `client`, with a
    /// three second inference timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not resolve.
    pub fn new(client: ScriptedInferenceClient) -> eyre::Result<Self> {
        Ok(Self::with_config(&test_config(Duration::from_secs(3))?, client))
    }

    /// Builds an application from an explicit configuration.
    #[must_use]
    pub fn with_config(config: &Config, client: ScriptedInferenceClient) -> Self {
        let audit = Arc::new(InMemoryAuditLog::new());
        let scripted = Arc::new(client);
        let backends = Backends {
            identities: Arc::new(InMemoryIdentityRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            audit: Arc::clone(&audit) as _,
        };
        let state = build_state(config, backends, Arc::clone(&scripted) as _);
        let router = router(Arc::clone(&state), config.server.cors_allow_any);
        Self {
            router,
            state,
            audit,
            client: scripted,
        }
    }

    /// Sends one request through the router and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the body is not
    /// JSON.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> eyre::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {bearer}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    /// Registers `email` with [`PASSWORD`] and returns the access token.
    ///
    /// # Errors
    ///
    /// Returns an error if registration does not answer `201`.
    pub async fn register(&self, email: &str) -> eyre::Result<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await?;
        eyre::ensure!(
            status == StatusCode::CREATED,
            "registration failed with {status}: {body}"
        );
        body["data"]["tokens"]["access_token"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| eyre::eyre!("registration response lacks an access token: {body}"))
    }

    /// Creates a task and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if creation does not answer `201`.
    pub async fn create_task(&self, token: &str, body: Value) -> eyre::Result<String> {
        let (status, response) = self
            .send(Method::POST, "/api/v1/tasks", Some(token), Some(body))
            .await?;
        eyre::ensure!(
            status == StatusCode::CREATED,
            "task creation failed with {status}: {response}"
        );
        response["data"]["id"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| eyre::eyre!("creation response lacks an id: {response}"))
    }

    /// Waits for background enrichment to settle.
    ///
    /// # Errors
    ///
    /// Returns an error if jobs are still running after [`GRACE`].
    pub async fn settle(&self) -> eyre::Result<()> {
        eyre::ensure!(
            self.state.tasks.wait_for_enrichment(GRACE).await,
            "enrichment jobs did not finish in time"
        );
        Ok(())
    }
}
