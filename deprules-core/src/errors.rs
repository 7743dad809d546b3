use std::io;

use thiserror::Error;

/// Result type used across the deprules core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Canonical error representation shared by the deprules crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    General(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Deserialization(err.to_string())
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::General(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {key}: {value:?} (expected a boolean)")]
    InvalidBool { key: String, value: String },

    #[error("environment variable {key} is not valid unicode")]
    InvalidEnvVar {
        key: String,
        #[source]
        source: std::env::VarError,
    },
}

impl From<ConfigError> for CoreError {
    fn from(value: ConfigError) -> Self {
        CoreError::Config(value.to_string())
    }
}
