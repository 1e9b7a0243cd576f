//! Domain model for enrichment requests, results, and audit records.

mod audit;
mod prompt;
mod subject;
mod suggestion;

pub use audit::{AuditOutcome, AuditRecord, ParseAuditOutcomeError};
pub use prompt::InferencePrompt;
pub use subject::EnrichmentSubject;
pub use suggestion::{Suggestion, SuggestionParseError, parse_suggestion};
pub(crate) use suggestion::json_object_span;
