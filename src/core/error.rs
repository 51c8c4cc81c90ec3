use thiserror::Error;

/// Centralized error types for the crate
///
/// Only genuinely failed operations become an `AppError` - a missing chapter,
/// a malformed lecture number, or a non-admin caller are all rendered as
/// recovery screens by the component that detects them and never reach this
/// enum. What remains is persistence and serialization failure, which the
/// router surfaces to the initiating admin as a failed operation.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// IO errors (snapshot export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (snapshot export)
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Validation errors that cannot be rendered as a re-prompt
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
