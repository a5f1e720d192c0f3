//! SQLite-backed persistent cache implementation.

use std::path::Path;

use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;

use super::CacheProvider;
use super::CachedValue;
use crate::error::CacheError;

/// A persistent cache backed by SQLite.
///
/// Data is stored in a SQLite database file and persists across process
/// restarts, so reference content survives between sessions. Uses WAL
/// journal mode for better concurrent read performance.
///
/// Store failures propagate as [`CacheError`]; they are never reported
/// as cache misses.
///
/// # Example
///
/// ```ignore
/// use open5e_client::cache::SqliteCache;
///
/// // File-based cache
/// let cache = SqliteCache::open("open5e-cache.db").await?;
///
/// // In-memory cache (for testing)
/// let cache = SqliteCache::open_in_memory().await?;
/// ```
pub struct SqliteCache {
    client: Client,
}

impl SqliteCache {
    /// Opens a SQLite cache at the specified path.
    ///
    /// Creates the database file and cache table if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory SQLite cache.
    ///
    /// Useful for testing. Data is lost when the cache is dropped.
    pub async fn open_in_memory() -> Result<Self, CacheError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Initializes the cache table schema.
    async fn init_schema(client: &Client) -> Result<(), CacheError> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS cache (
                        key TEXT PRIMARY KEY,
                        data BLOB NOT NULL,
                        document_key TEXT NOT NULL,
                        schema_version TEXT NOT NULL,
                        created_at INTEGER NOT NULL,
                        expires_at INTEGER NOT NULL
                    )",
                    [],
                )?;
                // Index for efficient GC queries
                conn.execute(
                    "CREATE INDEX IF NOT EXISTS idx_cache_expires_at ON cache(expires_at)",
                    [],
                )?;
                // Index for grouping/invalidation by rulebook
                conn.execute(
                    "CREATE INDEX IF NOT EXISTS idx_cache_document_key ON cache(document_key)",
                    [],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Returns the number of entries in the cache (including expired ones).
    pub async fn len(&self) -> Result<usize, CacheError> {
        let count = self
            .client
            .conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get::<_, i64>(0))
            })
            .await?;
        Ok(count as usize)
    }

    /// Returns `true` if the cache is empty.
    pub async fn is_empty(&self) -> Result<bool, CacheError> {
        self.len().await.map(|len| len == 0)
    }

    /// Removes all entries tagged with the given document key.
    ///
    /// Returns the number of entries removed. Useful for invalidating one
    /// rulebook's content without clearing cross-document reference data.
    pub async fn remove_document(&self, document_key: &str) -> Result<usize, CacheError> {
        let document_key = document_key.to_string();
        let removed = self
            .client
            .conn(move |conn| {
                conn.execute("DELETE FROM cache WHERE document_key = ?", [document_key])
            })
            .await?;
        Ok(removed)
    }
}

#[async_trait]
impl CacheProvider for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError> {
        let key = key.to_string();
        let now = Utc::now().timestamp();

        let row = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT data, document_key, schema_version, created_at, expires_at
                     FROM cache WHERE key = ? AND expires_at > ?",
                    rusqlite::params![key, now],
                    |row| {
                        let data: Vec<u8> = row.get(0)?;
                        let document_key: String = row.get(1)?;
                        let schema_version: String = row.get(2)?;
                        let created_at: i64 = row.get(3)?;
                        let expires_at: i64 = row.get(4)?;
                        Ok((data, document_key, schema_version, created_at, expires_at))
                    },
                )
                .optional()
            })
            .await?;

        let Some((data, document_key, schema_version, created_at, expires_at)) = row else {
            return Ok(None);
        };
        let (Some(created_at), Some(expires_at)) = (
            Utc.timestamp_opt(created_at, 0).single(),
            Utc.timestamp_opt(expires_at, 0).single(),
        ) else {
            return Ok(None);
        };

        Ok(Some(CachedValue {
            data,
            document_key,
            schema_version,
            created_at,
            expires_at,
        }))
    }

    async fn set(&self, key: &str, value: CachedValue) -> Result<(), CacheError> {
        let key = key.to_string();
        let data = value.data;
        let document_key = value.document_key;
        let schema_version = value.schema_version;
        let created_at = value.created_at.timestamp();
        let expires_at = value.expires_at.timestamp();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO cache
                     (key, data, document_key, schema_version, created_at, expires_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    rusqlite::params![key, data, document_key, schema_version, created_at, expires_at],
                )
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM cache WHERE key = ?", [key]))
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.client
            .conn(|conn| conn.execute("DELETE FROM cache", []))
            .await?;
        Ok(())
    }

    async fn gc(&self) -> Result<usize, CacheError> {
        let now = Utc::now().timestamp();

        let removed = self
            .client
            .conn(move |conn| conn.execute("DELETE FROM cache WHERE expires_at <= ?", [now]))
            .await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(ttl: Duration) -> CachedValue {
        CachedValue::with_ttl(b"[1,2,3]".to_vec(), "wotc-srd", "1", ttl)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        cache
            .set("classes", entry(Duration::from_secs(3600)))
            .await
            .unwrap();

        let got = cache.get("classes").await.unwrap().unwrap();
        assert_eq!(got.data, b"[1,2,3]");
        assert_eq!(got.document_key, "wotc-srd");
        assert_eq!(got.schema_version, "1");
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        cache.set("classes", entry(Duration::ZERO)).await.unwrap();

        assert!(cache.get("classes").await.unwrap().is_none());
        assert_eq!(cache.gc().await.unwrap(), 1);
        assert!(cache.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        cache.set("k", entry(Duration::from_secs(3600))).await.unwrap();
        let mut second = entry(Duration::from_secs(3600));
        second.data = b"updated".to_vec();
        cache.set("k", second).await.unwrap();

        assert_eq!(cache.len().await.unwrap(), 1);
        assert_eq!(cache.get("k").await.unwrap().unwrap().data, b"updated");
    }

    #[tokio::test]
    async fn test_remove_document_scopes_by_tag() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        cache.set("a", entry(Duration::from_secs(3600))).await.unwrap();
        let mut global = entry(Duration::from_secs(3600));
        global.document_key = super::super::GLOBAL_DOCUMENT_KEY.to_string();
        cache.set("b", global).await.unwrap();

        assert_eq!(cache.remove_document("wotc-srd").await.unwrap(), 1);
        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_error() {
        let cache = SqliteCache::open_in_memory().await.unwrap();

        // Break the store out from under the cache
        cache
            .client
            .conn(|conn| conn.execute("DROP TABLE cache", []))
            .await
            .unwrap();

        let write = cache.set("k", entry(Duration::from_secs(3600))).await;
        assert!(matches!(write, Err(CacheError::Sqlite(_))));
        let read = cache.get("k").await;
        assert!(matches!(read, Err(CacheError::Sqlite(_))));
    }
}
