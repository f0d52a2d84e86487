//! Error types for password reset.

use oxide_table::TableError;
use thiserror::Error;

/// Password reset errors.
#[derive(Debug, Error)]
pub enum ResetError {
    /// Table layer error.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// Every generated token collided with an existing one.
    #[error("maximum attempts ({0}) reached for token generation")]
    MaxAttempts(u32),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The user directory rejected the new password.
    #[error("user directory error: {0}")]
    Directory(String),

    /// A stored entry could not be read back.
    #[error("malformed reset entry: {0}")]
    Malformed(String),
}

/// Result type alias for password reset operations.
pub type Result<T> = std::result::Result<T, ResetError>;
