//! Success envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// A successful response wrapped as `{"status": "success", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSuccess<T> {
    status: StatusCode,
    data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    /// 200 OK.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }

    /// 201 Created.
    #[must_use]
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
        }
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<T> {
    status: &'static str,
    data: T,
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let envelope = SuccessEnvelope {
            status: "success",
            data: self.data,
        };
        (self.status, Json(envelope)).into_response()
    }
}
