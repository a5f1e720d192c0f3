//! Cache-aside orchestration: read-through, write-back.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::cache_key;
use crate::cache::CachedValue;
use crate::cache::GLOBAL_DOCUMENT_KEY;
use crate::error::CacheError;
use crate::error::Error;
use crate::params::QueryParams;
use crate::response::Response;
use crate::Open5eClient;

use super::FetchOptions;

impl Open5eClient {
    /// Cached variant of [`fetch`](Open5eClient::fetch).
    ///
    /// If a fresh cache entry exists under the computed key it is
    /// returned without any network call. On a miss (or with `force_refresh`) the value is
    /// fetched and written back under the key before returning; a failed
    /// fetch leaves the cache untouched and propagates the error.
    pub async fn fetch_cached<T>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        options: &FetchOptions,
    ) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned + Serialize,
    {
        let key = cache_key(endpoint, params, false);
        self.get_or_fetch(&key, options, self.fetch(endpoint, params, options))
            .await
    }

    /// Cached variant of [`fetch_all`](Open5eClient::fetch_all).
    ///
    /// The aggregated page results are cached as one entry, keyed with an
    /// all-pages marker so it never collides with a single-resource entry
    /// for the same endpoint and params. The write happens only after the
    /// full pagination walk succeeds.
    pub async fn fetch_all_cached<T>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        options: &FetchOptions,
    ) -> Result<Response<Vec<T>>, Error>
    where
        T: DeserializeOwned + Serialize,
    {
        let key = cache_key(endpoint, params, true);
        self.get_or_fetch(&key, options, self.fetch_all(endpoint, params, options))
            .await
    }

    /// The cache-aside primitive both cached fetch variants are built on.
    ///
    /// Without a configured cache provider this degenerates to running
    /// the fetch. `force_refresh` skips the read but still writes, so a
    /// forced refresh repopulates the cache for subsequent callers. An
    /// entry whose schema version differs from the configured one reads
    /// as a miss. Store failures propagate as [`Error::Cache`] rather
    /// than masquerading as misses.
    pub(crate) async fn get_or_fetch<T, Fut>(
        &self,
        key: &str,
        options: &FetchOptions,
        fetch: Fut,
    ) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned + Serialize,
        Fut: Future<Output = Result<T, Error>>,
    {
        let Some(cache) = &self.inner.cache else {
            return Ok(Response::new(fetch.await?));
        };

        if !options.force_refresh {
            if let Some(cached) = cache.get(key).await? {
                if cached.schema_version == self.inner.cache_config.schema_version {
                    tracing::trace!(key, "cache hit");
                    let value: T =
                        serde_json::from_slice(&cached.data).map_err(CacheError::Serialization)?;
                    return Ok(Response::cache_hit(value, cached.created_at, cached.expires_at));
                }
                tracing::debug!(key, "cache entry has stale schema version, refetching");
            } else {
                tracing::trace!(key, "cache miss");
            }
        }

        let value = fetch.await?;

        let data = serde_json::to_vec(&value).map_err(CacheError::Serialization)?;
        let entry = CachedValue::with_ttl(
            data,
            options.document_key.as_deref().unwrap_or(GLOBAL_DOCUMENT_KEY),
            self.inner.cache_config.schema_version.clone(),
            self.effective_ttl(options),
        );
        let cached_at = entry.created_at;
        let expires_at = entry.expires_at;
        cache.set(key, entry).await?;

        Ok(Response::cache_miss(value, cached_at, expires_at))
    }

    fn effective_ttl(&self, options: &FetchOptions) -> Duration {
        options.ttl.unwrap_or(self.inner.cache_config.default_ttl)
    }
}
