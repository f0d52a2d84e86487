//! Error types for the table layer.

use thiserror::Error;

/// Errors raised by schema definition and table operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// The schema is malformed (no primary key, invalid auto-increment,
    /// bad identifier, ...). Raised at definition time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A logical column type name is not registered.
    #[error("unknown column type: {0}")]
    UnknownType(String),

    /// A destructive statement had no effective filter.
    #[error("unsafe operation: {0}")]
    UnsafeOperation(String),

    /// The store reported a failure. Carries the driver's message.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A value does not fit its column's logical type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Encoding a composite value failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<sqlx::Error> for TableError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
