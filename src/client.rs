//! Main Open5eClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::cache::CacheConfig;
use crate::cache::CacheProvider;
use crate::error::Error;
use crate::rate_limit::QueueStats;
use crate::rate_limit::RequestQueue;
use crate::rate_limit::RetryConfig;

/// Default base URL for the Open5E v2 API.
pub const DEFAULT_BASE_URL: &str = "https://api.open5e.com/v2";

/// The main client for the Open5E content API.
///
/// Wraps the remote API with a bounded-concurrency request queue,
/// retry with exponential backoff, transparent pagination, and an
/// optional cache-aside persistence layer.
///
/// This client is cheap to clone (uses `Arc` internally) and can be
/// shared across threads safely. Construct one at application startup and
/// pass it to whatever needs it; there is no global instance.
///
/// # Example
///
/// ```ignore
/// use open5e_client::{Open5eClient, cache::SqliteCache};
///
/// let cache = SqliteCache::open("open5e-cache.db").await?;
/// let client = Open5eClient::builder()
///     .cache(cache)
///     .build();
///
/// let spells = client.spells().document("wotc-srd").await?;
/// ```
#[derive(Clone)]
pub struct Open5eClient {
    pub(crate) inner: Arc<Open5eClientInner>,
}

pub(crate) struct Open5eClientInner {
    pub(crate) base_url: String,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
    pub(crate) queue: RequestQueue,
    pub(crate) retry_config: RetryConfig,
    pub(crate) cache: Option<Arc<dyn CacheProvider>>,
    pub(crate) cache_config: CacheConfig,
    pub(crate) default_page_size: usize,
    pub(crate) max_pages: Option<u32>,
}

impl Open5eClient {
    /// Creates a new client with default settings and no cache.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new builder for constructing a client.
    pub fn builder() -> Open5eClientBuilder {
        Open5eClientBuilder::new()
    }

    /// Returns the base URL of the API.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns a snapshot of the request queue's occupancy.
    pub fn queue_stats(&self) -> QueueStats {
        self.inner.queue.stats()
    }

    /// Clears all entries from the cache, if one is configured.
    pub async fn clear_cache(&self) -> Result<(), Error> {
        if let Some(cache) = &self.inner.cache {
            cache.clear().await?;
        }
        Ok(())
    }

    /// Removes expired entries from the cache, if one is configured.
    ///
    /// Returns the number of entries removed.
    pub async fn gc_cache(&self) -> Result<usize, Error> {
        match &self.inner.cache {
            Some(cache) => Ok(cache.gc().await?),
            None => Ok(0),
        }
    }
}

impl Default for Open5eClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing an [`Open5eClient`].
///
/// Every field has a default, so `Open5eClient::builder().build()` yields
/// a working client against the public API with no cache. Tests construct
/// fast, deterministic instances by zeroing the delays.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use open5e_client::{Open5eClient, rate_limit::RetryConfig};
///
/// let client = Open5eClient::builder()
///     .max_concurrent(3)
///     .batch_delay(Duration::from_millis(50))
///     .retry_config(RetryConfig::default().max_retries(5))
///     .default_page_size(100)
///     .build();
/// ```
pub struct Open5eClientBuilder {
    base_url: String,
    http_client: Option<Client>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_concurrent: usize,
    batch_delay: Duration,
    retry_config: RetryConfig,
    cache: Option<Arc<dyn CacheProvider>>,
    cache_config: CacheConfig,
    default_page_size: usize,
    max_pages: Option<u32>,
}

impl Open5eClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: None,
            timeout: None,
            connect_timeout: None,
            max_concurrent: 5,
            batch_delay: Duration::from_millis(100),
            retry_config: RetryConfig::default(),
            cache: None,
            cache_config: CacheConfig::default(),
            default_page_size: 50,
            max_pages: None,
        }
    }

    /// Sets the API base URL.
    ///
    /// Defaults to [`DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the per-request timeout.
    ///
    /// There is no default; a caller wanting a hard deadline can also
    /// cancel through the per-request cancellation token.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of simultaneous in-flight requests.
    ///
    /// Defaults to 5.
    pub fn max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = limit;
        self
    }

    /// Sets the delay between dispatching successive request batches.
    ///
    /// Defaults to 100 ms.
    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Sets the retry policy.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Sets the cache provider.
    ///
    /// Without one, cached fetch operations behave as plain fetches.
    pub fn cache<C: CacheProvider + 'static>(mut self, cache: C) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Sets a shared cache provider.
    pub fn shared_cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the cache TTL configuration.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Sets the default page size for paginated fetches.
    ///
    /// Defaults to 50.
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Caps the number of pages a single paginated fetch may walk.
    ///
    /// Unset by default: pagination follows `next` links until the API
    /// reports no more pages. With a cap, exceeding it fails the whole
    /// fetch with [`ApiError::PageLimit`](crate::error::ApiError::PageLimit).
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = Some(pages);
        self
    }

    /// Builds the [`Open5eClient`].
    pub fn build(self) -> Open5eClient {
        let http_client = self.http_client.unwrap_or_else(|| {
            let mut builder = Client::builder();
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            builder.build().expect("Failed to build HTTP client")
        });

        Open5eClient {
            inner: Arc::new(Open5eClientInner {
                base_url: self.base_url,
                http_client,
                timeout: self.timeout,
                queue: RequestQueue::new(self.max_concurrent, self.batch_delay),
                retry_config: self.retry_config,
                cache: self.cache,
                cache_config: self.cache_config,
                default_page_size: self.default_page_size,
                max_pages: self.max_pages,
            }),
        }
    }
}

impl Default for Open5eClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
