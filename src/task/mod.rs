//! Owner-scoped task tracking.
//!
//! Tasks belong to exactly one identity and are only ever read or mutated
//! through owner-scoped repository calls, so a task owned by someone else is
//! indistinguishable from a missing one. Newly created tasks are handed to
//! the enrichment pipeline, which may later fill in the AI suggestion
//! fields. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
