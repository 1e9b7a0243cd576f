//! Adapter implementations of the enrichment ports.
//!
//! - [`http::ChatCompletionsClient`]: OpenAI-compatible chat completions
//! - [`disabled::DisabledInferenceClient`]: used when no API key is configured
//! - [`scripted::ScriptedInferenceClient`]: canned replies, delays, and hangs
//! - [`memory::InMemoryAuditLog`] and [`postgres::PostgresAuditLog`]

pub mod disabled;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod scripted;
