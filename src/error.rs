//! Error types for the ranking core
//!
//! Public operations return `anyhow::Result`; the specific failure cases are
//! variants of [`RankingError`] and can be recovered with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Corrupt history store under key '{key}': {reason}")]
    CorruptHistoryStore { key: String, reason: String },

    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("Duplicate item in catalog: {item_id}")]
    DuplicateItem { item_id: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Random source unavailable: {message}")]
    RandomSourceError { message: String },
}
