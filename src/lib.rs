//! Taskwright: a multi-user task tracker backend.
//!
//! Authenticated users manage their own tasks. Each newly created task is
//! handed to a best-effort enrichment pipeline that asks an inference
//! provider for a suggested priority and duration. Enrichment never blocks
//! or fails a request.
//!
//! # Architecture
//!
//! Taskwright follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, etc.)
//! - **Services**: Orchestration of domain values through ports
//!
//! # Modules
//!
//! - [`identity`]: Credential store, password hashing, and bearer tokens
//! - [`task`]: Owner-scoped task storage and the task service
//! - [`enrichment`]: Rate-limited, time-bounded AI suggestions with an audit trail
//! - [`agent`]: Natural-language task actions over the task service
//! - [`api`]: HTTP surface and the session boundary
//! - [`app`], [`config`], [`telemetry`]: Process wiring

pub mod agent;
pub mod api;
pub mod app;
pub mod config;
pub mod enrichment;
pub mod identity;
pub mod task;
pub mod telemetry;
