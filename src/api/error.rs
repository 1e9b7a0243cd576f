//! Error taxonomy of the HTTP surface and its envelope rendering.

use crate::agent::services::AgentError;
use crate::identity::{ports::IdentityRepositoryError, services::CredentialError};
use crate::task::{ports::TaskRepositoryError, services::TaskServiceError};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use tracing::{debug, error};

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Kind of failure reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or invalid input.
    Validation,
    /// Missing, invalid, or expired bearer token.
    Unauthenticated,
    /// Login failure. Never says which half was wrong.
    InvalidCredentials,
    /// Authenticated but not entitled.
    Forbidden,
    /// Absent, or owned by someone else.
    NotFound,
    /// Duplicate unique key.
    Conflict,
    /// A synchronous AI call was required and failed.
    AiUnavailable,
    /// Anything the caller cannot act on.
    Internal,
}

impl ErrorKind {
    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::AiUnavailable => "AI_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An error rendered as the error envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Validation failure on one request field.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message).with_details(json!({ "field": field }))
    }

    /// Missing or rejected bearer token.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(ErrorKind::Unauthenticated, "missing or invalid bearer token")
    }

    /// Resource absent or not owned by the caller.
    #[must_use]
    pub fn not_found(what: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("{what} not found"))
    }

    /// Logs `source` and returns a generic internal error.
    #[must_use]
    pub fn internal(source: &dyn fmt::Display) -> Self {
        error!(error = %source, "request failed");
        Self::new(ErrorKind::Internal, "internal server error")
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    status: &'static str,
    error: ErrorBody<'a>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            status: "error",
            error: ErrorBody {
                code: self.kind.code(),
                message: &self.message,
                details: self.details.as_ref(),
            },
        };
        (self.kind.status(), Json(envelope)).into_response()
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Domain(domain) => {
                Self::invalid_field(domain.field(), domain.to_string())
            }
            CredentialError::Conflict
            | CredentialError::Repository(IdentityRepositoryError::DuplicateEmail(_)) => {
                Self::new(ErrorKind::Conflict, "email already registered")
            }
            CredentialError::InvalidCredentials => {
                Self::new(ErrorKind::InvalidCredentials, "invalid email or password")
            }
            CredentialError::Unauthenticated(reason) => {
                debug!(%reason, "bearer token rejected");
                Self::unauthenticated()
            }
            other => Self::internal(&other),
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Domain(domain) => {
                Self::invalid_field(domain.field(), domain.to_string())
            }
            TaskServiceError::Repository(TaskRepositoryError::NotFound(_)) => {
                Self::not_found("task")
            }
            other => Self::internal(&other),
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Message(message) => Self::invalid_field("message", message.to_string()),
            AgentError::Unavailable(reason) => {
                debug!(%reason, "agent unavailable");
                Self::new(ErrorKind::AiUnavailable, "the task agent is unavailable")
            }
            AgentError::Task(task) => task.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(ErrorKind::Validation, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(ErrorKind::Validation, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(ErrorKind::Validation, rejection.body_text())
    }
}
