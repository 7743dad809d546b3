//! Core shared library for the deprules workspace.
//!
//! This crate exposes the ambient pieces the grammar and validation crates
//! depend on: the canonical error type, environment-driven configuration,
//! logging setup and a couple of serde helpers.

pub mod config;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use config::{load_engine_config, EngineConfig};
pub use errors::{ConfigError, CoreError, Result as CoreResult};
pub use logging::init_tracing;
