//! Error types for the command-line tool.

use std::path::PathBuf;

use quarry_core::QueryError;

/// Errors raised while reading input or running commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A `--where` argument was not of the form `column=value`.
    #[error("invalid filter '{0}': expected column=value")]
    InvalidFilter(String),

    /// An `--order` argument named an unknown direction.
    #[error("invalid ordering '{0}': expected column or column:asc|desc")]
    InvalidOrder(String),

    /// A statement failed while running a script.
    #[error("statement {index} failed: {source}")]
    Statement {
        /// One-based position of the statement in the script.
        index: usize,
        /// Underlying query error.
        source: QueryError,
    },

    /// Query building, configuration or connection error.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Failed to read a script file.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path of the script.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// IO error while writing output or reading stdin.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to render output as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
