//! Common error types for arena services

use thiserror::Error;

/// Common result type for arena operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across arena services
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

    /// Ingested batch could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Persisted JSON (scoring state, entry details) could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
