//! Step definitions for task tracking scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
