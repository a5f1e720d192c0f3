//! Cache-layer error types

/// Errors from the local cache store.
///
/// Cache failures are never silently downgraded to misses; they propagate
/// so a broken store is visible to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Error from the SQLite-backed cache.
    #[error("Cache storage error: {0}")]
    Sqlite(#[from] async_sqlite::Error),

    /// Failed to serialize or deserialize a cached payload.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
