//! Router assembly and shared handler state.

use super::envelope::ApiSuccess;
use super::error::ApiError;
use super::session::require_identity;
use super::types::HealthResponse;
use super::{agent, auth, tasks};
use crate::agent::services::TaskAgent;
use crate::identity::{ports::IdentityRepository, services::CredentialService};
use crate::task::{ports::TaskRepository, services::TaskService};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use mockable::DefaultClock;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Credential service as wired into the router.
pub type SharedCredentials = CredentialService<dyn IdentityRepository, DefaultClock>;

/// Task service as wired into the router.
pub type SharedTasks = TaskService<dyn TaskRepository, DefaultClock>;

/// Task agent as wired into the router.
pub type SharedAgent = TaskAgent<dyn TaskRepository, DefaultClock>;

/// State shared by every handler.
pub struct AppState {
    /// Credential store and verifier.
    pub credentials: SharedCredentials,
    /// Task lifecycle service.
    pub tasks: SharedTasks,
    /// Natural-language task agent.
    pub agent: SharedAgent,
    /// Time source for derived response fields.
    pub clock: Arc<DefaultClock>,
}

/// Builds the application router.
///
/// When `cors_allow_any` is set every origin is accepted.
#[must_use]
pub fn router(state: Arc<AppState>, cors_allow_any: bool) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh));

    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route(
            "/api/v1/tasks/:id",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/v1/agent/chat", post(agent::chat))
        .route("/api/v1/agent/capabilities", get(agent::capabilities))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_identity,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn health() -> ApiSuccess<HealthResponse> {
    ApiSuccess::ok(HealthResponse {
        status: "healthy".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("route")
}
