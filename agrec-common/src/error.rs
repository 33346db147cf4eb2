//! Common error types for AGREC

use thiserror::Error;

/// Common result type for AGREC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the AGREC crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source store fetch failed or timed out
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A pipeline stage expected a column its input does not carry
    #[error("Schema mismatch in {stage}: column '{column}' not found")]
    SchemaMismatch { stage: String, column: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a schema-mismatch error
    pub fn schema_mismatch(stage: &str, column: &str) -> Self {
        Error::SchemaMismatch {
            stage: stage.to_string(),
            column: column.to_string(),
        }
    }
}
