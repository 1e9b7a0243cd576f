//! Unit tests for the enrichment module.

mod rate_limit_tests;
