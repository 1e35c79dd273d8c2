use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during character operations.
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("Database not configured")]
    DatabaseUnavailable,
    #[error("character not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid voice sample: {0}")]
    InvalidSample(String),
    #[error("failed to write voice sample {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
