use std::env;
use std::path::PathBuf;

use crate::errors::{ConfigError, CoreError};

/// Default prefix for every environment variable read by [`EngineConfig`].
pub const DEFAULT_PREFIX: &str = "DEPRULES_";

/// Runtime settings shared by the grammar compiler and the front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Treat patterns that match no known class as compile errors instead of warnings.
    pub strict_patterns: bool,
    /// Default tracing level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Grammar file used when a command does not name one.
    pub grammar_path: Option<PathBuf>,
    /// Class list used when a command does not name one.
    pub classes_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_patterns: false,
            log_level: "info".to_string(),
            grammar_path: None,
            classes_path: None,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the process environment (`DEPRULES_*`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix(DEFAULT_PREFIX)
    }

    /// Loads configuration from env vars prefixed with the provided value (e.g. `EDITOR_`).
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);
        let defaults = Self::default();

        let strict_patterns = match read_var(&key("STRICT_PATTERNS"))? {
            Some(raw) => parse_bool(&key("STRICT_PATTERNS"), &raw)?,
            None => defaults.strict_patterns,
        };

        let log_level = read_var(&key("LOG"))?.unwrap_or(defaults.log_level);
        let grammar_path = read_var(&key("GRAMMAR"))?.map(PathBuf::from);
        let classes_path = read_var(&key("CLASSES"))?.map(PathBuf::from);

        Ok(Self {
            strict_patterns,
            log_level,
            grammar_path,
            classes_path,
        })
    }
}

/// Helper that loads config and converts to the canonical core error type.
pub fn load_engine_config() -> Result<EngineConfig, CoreError> {
    Ok(EngineConfig::from_env()?)
}

fn read_var(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(ConfigError::InvalidEnvVar {
            key: key.to_string(),
            source,
        }),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
