//! In-memory cache implementation using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::CacheProvider;
use super::CachedValue;
use crate::error::CacheError;

/// An in-memory cache backed by a concurrent hash map.
///
/// This is the default cache implementation. It's fast and thread-safe,
/// but data is lost when the process exits. Expired entries are lazily
/// evicted on `get`.
///
/// # Example
///
/// ```
/// use open5e_client::cache::InMemoryCache;
///
/// let cache = InMemoryCache::new();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCache {
    store: DashMap<String, CachedValue>,
}

impl InMemoryCache {
    /// Creates a new empty in-memory cache.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Creates a new in-memory cache with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries in the cache (including expired ones).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError> {
        let Some(entry) = self.store.get(key) else {
            return Ok(None);
        };
        let value = entry.value();

        if value.is_expired() {
            drop(entry);
            self.store.remove(key);
            Ok(None)
        } else {
            Ok(Some(value.clone()))
        }
    }

    async fn set(&self, key: &str, value: CachedValue) -> Result<(), CacheError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.store.clear();
        Ok(())
    }

    async fn gc(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        self.store.retain(|_, value| {
            if value.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
