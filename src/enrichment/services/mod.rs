//! Enrichment gateway and its process-wide rate limiter.

mod gateway;
mod rate_limit;

pub use gateway::{EnrichmentGateway, GatewaySettings};
pub use rate_limit::{RateLimitError, RateLimiter};
