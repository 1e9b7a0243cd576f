//! Process wiring: storage backends, services, the router, and the serve
//! loop.

use crate::agent::services::TaskAgent;
use crate::api::{AppState, router};
use crate::config::{Config, ConfigError, EnrichmentConfig, StorageKind};
use crate::enrichment::{
    adapters::{
        disabled::DisabledInferenceClient, http::ChatCompletionsClient, memory::InMemoryAuditLog,
        postgres::PostgresAuditLog,
    },
    ports::{AuditLog, InferenceClient},
    services::EnrichmentGateway,
};
use crate::identity::{
    adapters::{memory::InMemoryIdentityRepository, postgres::PostgresIdentityRepository},
    ports::IdentityRepository,
    services::{CredentialService, CredentialSettings, TokenIssuer},
};
use crate::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskRepository,
    services::TaskService,
};
use anyhow::Context;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::QueryResult;
use mockable::DefaultClock;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Bundled schema, applied in order by [`apply_schema`].
pub const SCHEMA: [&str; 2] = [
    include_str!("../migrations/2026-03-01-000000_create_identities_and_tasks/up.sql"),
    include_str!("../migrations/2026-03-01-000001_create_enrichment_audit/up.sql"),
];

/// Connection pool shared by every `PostgreSQL` adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Storage adapters behind the services.
#[derive(Clone)]
pub struct Backends {
    /// Identity store.
    pub identities: Arc<dyn IdentityRepository>,
    /// Task store.
    pub tasks: Arc<dyn TaskRepository>,
    /// Enrichment audit trail.
    pub audit: Arc<dyn AuditLog>,
}

impl Backends {
    /// Process-local stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            identities: Arc::new(InMemoryIdentityRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            audit: Arc::new(InMemoryAuditLog::new()),
        }
    }

    /// `PostgreSQL` stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            identities: Arc::new(PostgresIdentityRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditLog::new(pool.clone())),
        }
    }
}

/// Applies [`SCHEMA`]. Every statement is idempotent.
///
/// # Errors
///
/// Returns the first failing statement's error.
pub fn apply_schema(connection: &mut PgConnection) -> QueryResult<()> {
    SCHEMA
        .iter()
        .try_for_each(|sql| connection.batch_execute(sql))
}

/// Builds the pool off the async runtime and optionally applies the schema.
///
/// # Errors
///
/// Returns an error when the pool cannot connect or the schema fails.
pub async fn connect_postgres(
    url: &str,
    pool_size: u32,
    migrate: bool,
) -> anyhow::Result<PgPool> {
    let database_url = url.to_owned();
    tokio::task::spawn_blocking(move || {
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(ConnectionManager::<PgConnection>::new(database_url))
            .context("failed to build database pool")?;
        if migrate {
            let mut connection = pool.get().context("failed to check out a connection")?;
            apply_schema(&mut connection).context("failed to apply schema")?;
            info!("database schema applied");
        }
        Ok::<_, anyhow::Error>(pool)
    })
    .await
    .context("database setup task failed")?
}

/// Picks the inference client: the chat-completions client when an API key
/// is configured, otherwise one that fails every call.
#[must_use]
pub fn inference_client(config: &EnrichmentConfig) -> Arc<dyn InferenceClient> {
    let Some(api_key) = &config.api_key else {
        warn!("no inference API key configured, AI enrichment disabled");
        return Arc::new(DisabledInferenceClient);
    };
    info!(model = %config.model, "AI enrichment enabled");
    Arc::new(ChatCompletionsClient::new(
        config.endpoint.clone(),
        config.model.clone(),
        api_key.expose(),
    ))
}

/// Assembles the services and the state shared by every handler.
///
/// Enrichment and the task agent share `client` but keep separate rate
/// limits.
#[must_use]
pub fn build_state(
    config: &Config,
    backends: Backends,
    client: Arc<dyn InferenceClient>,
) -> Arc<AppState> {
    let clock = Arc::new(DefaultClock);

    let credentials = CredentialService::new(
        backends.identities,
        Arc::clone(&clock),
        CredentialSettings {
            policy: config.auth.password_policy,
            hasher: config.auth.hasher,
            tokens: TokenIssuer::new(
                config.auth.jwt_secret.expose().as_bytes(),
                config.auth.tokens,
            ),
        },
    );

    let gateway = EnrichmentGateway::new(
        Arc::clone(&client),
        backends.audit,
        Arc::clone(&clock),
        config.enrichment.gateway,
    );
    let tasks = TaskService::new(backends.tasks, Arc::new(gateway), Arc::clone(&clock))
        .with_page_policy(config.pagination);
    let agent = TaskAgent::new(client, tasks.clone(), Arc::clone(&clock), config.agent);

    Arc::new(AppState {
        credentials,
        tasks,
        agent,
        clock,
    })
}

/// Runs the server until a shutdown signal arrives, then gives in-flight
/// enrichment jobs the configured grace period.
///
/// # Errors
///
/// Returns an error when storage cannot be set up, the listener cannot
/// bind, or the server fails.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    if config.auth.ephemeral_secret {
        warn!("using an ephemeral JWT secret, tokens will not survive a restart");
    }

    let backends = match config.storage.kind {
        StorageKind::Memory => {
            warn!("using in-memory storage, all data is lost on exit");
            Backends::in_memory()
        }
        StorageKind::Postgres => {
            let url = config
                .storage
                .database_url
                .as_ref()
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            let pool =
                connect_postgres(url.expose(), config.storage.pool_size, config.storage.migrate)
                    .await?;
            info!(pool_size = config.storage.pool_size, "connected to PostgreSQL");
            Backends::postgres(&pool)
        }
    };

    let client = inference_client(&config.enrichment);
    let state = build_state(config, backends, client);
    let app = router(Arc::clone(&state), config.server.cors_allow_any);

    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(addr = %config.server.bind, "taskwright listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let drained = state.tasks.shutdown(config.enrichment.shutdown_grace).await;
    info!(drained, "taskwright stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, closing listener");
}
