//! Error types for cache operations.

use thiserror::Error;

/// Errors that can occur while reading or writing the description cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failure creating the cache directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results with [`CacheError`].
pub type Result<T> = std::result::Result<T, CacheError>;
