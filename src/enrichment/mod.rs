//! Best-effort AI enrichment of newly created tasks.
//!
//! The [`services::EnrichmentGateway`] wraps a single call to an external
//! inference provider with a sliding-window rate limit and a hard timeout,
//! parses the untrusted reply into a [`domain::Suggestion`], and records an
//! audit entry for every attempt. Every failure collapses to "no
//! suggestion"; nothing is ever raised to the caller.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The gateway and rate limiter in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
