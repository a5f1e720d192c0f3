//! Generic caching layer
//!
//! Provides a `CacheProvider` trait and implementations for caching
//! serialized API responses with TTL support. Used by the Open5E client
//! for its cache-aside read/write path.

mod config;
mod key;
mod memory;
mod sqlite;

pub use config::*;
pub use key::*;
pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::CacheError;

/// Document key tag for cross-rulebook reference data (conditions,
/// damage types, and other content not scoped to one source book).
pub const GLOBAL_DOCUMENT_KEY: &str = "global";

/// A cached value with metadata about when it was cached and when it expires.
#[derive(Debug, Clone)]
pub struct CachedValue {
    /// The cached payload, serialized as JSON bytes.
    pub data: Vec<u8>,
    /// Logical partition tag: a rulebook key, or [`GLOBAL_DOCUMENT_KEY`]
    /// for cross-document reference data. Informational grouping only;
    /// does not participate in key uniqueness.
    pub document_key: String,
    /// Opaque payload format version, for invalidation on format change.
    pub schema_version: String,
    /// When this value was cached.
    pub created_at: DateTime<Utc>,
    /// When this value expires and should no longer be returned.
    pub expires_at: DateTime<Utc>,
}

impl CachedValue {
    /// Creates a new cached value with a TTL from now.
    pub fn with_ttl(
        data: Vec<u8>,
        document_key: impl Into<String>,
        schema_version: impl Into<String>,
        ttl: std::time::Duration,
    ) -> Self {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        Self {
            data,
            document_key: document_key.into(),
            schema_version: schema_version.into(),
            created_at: now,
            expires_at,
        }
    }

    /// Returns `true` if this cached value has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Trait for cache providers.
///
/// Implementations store and retrieve cached values by string keys.
/// The provider is responsible for:
/// - Never returning expired values from `get()`
/// - Storing values with their expiration metadata
/// - Providing garbage collection for expired entries
///
/// Writes to one key overwrite any previous entry (last-writer-wins);
/// concurrent writers for a key always carry equivalently fresh data, so
/// no versioning is required.
///
/// Storage failures are reported as errors, never downgraded to misses:
/// a broken store must be visible to the caller, not read as permanently
/// empty.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Retrieves a cached value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or the value has
    /// expired. Implementations must never return expired values.
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError>;

    /// Stores a value in the cache, overwriting any existing entry.
    async fn set(&self, key: &str, value: CachedValue) -> Result<(), CacheError>;

    /// Removes a value from the cache.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Clears all values from the cache.
    async fn clear(&self) -> Result<(), CacheError>;

    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    async fn gc(&self) -> Result<usize, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_with_ttl_sets_expiry() {
        let value = CachedValue::with_ttl(b"{}".to_vec(), "wotc-srd", "1", Duration::from_secs(60));
        assert!(!value.is_expired());
        assert!(value.expires_at > value.created_at);
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let value = CachedValue::with_ttl(b"{}".to_vec(), GLOBAL_DOCUMENT_KEY, "1", Duration::ZERO);
        assert!(value.is_expired());
    }
}
