//! Shared building blocks for every command
//!
//! - **config**: advisory-rail.toml parsing and validation
//! - **context**: per-invocation configuration and service clients
//! - **error**: error types with contextual help and exit codes

pub mod config;
pub mod context;
pub mod error;
