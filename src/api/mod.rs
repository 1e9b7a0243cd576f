//! HTTP surface.
//!
//! Every response uses the same JSON envelope:
//!
//! - success: `{"status": "success", "data": ...}`
//! - error: `{"status": "error", "error": {"code", "message", "details"?}}`
//!
//! Protected routes sit behind the session boundary in [`session`], which
//! resolves the bearer token to an identity before any handler runs.

pub mod agent;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod routes;
pub mod session;
pub mod tasks;
pub mod types;

pub use envelope::ApiSuccess;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use routes::{AppState, router};
pub use session::AuthenticatedIdentity;
