//! Error types for query building and execution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by builders, grammars, connections and the manager.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The builder or manager was used with an invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A connection configuration could not be applied.
    #[error("connection error: {0}")]
    Connection(String),

    /// A grammar could not express the requested query shape.
    #[error("compilation error: {0}")]
    Compilation(String),

    /// The backend failed to execute a statement.
    #[error("execution error: {0}")]
    Execution(String),

    /// A configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl QueryError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

/// Result type alias for quarry operations.
pub type Result<T> = std::result::Result<T, QueryError>;
