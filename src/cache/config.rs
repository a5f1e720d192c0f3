//! Cache configuration

use std::time::Duration;

/// Version tag written into every cache entry. Bump when the cached
/// payload format changes so stale-format entries read as misses.
pub const SCHEMA_VERSION: &str = "1";

/// Configuration for cache TTL (time-to-live) settings.
///
/// Controls how long different categories of Open5E content are cached
/// before expiring.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use open5e_client::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_reference_ttl(Duration::from_secs(30 * 24 * 3600))
///     .with_default_ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for rarely-changing reference data (conditions, skills,
    /// damage types).
    ///
    /// Default: 7 days
    pub reference_ttl: Duration,

    /// TTL for rulebook content (spells, classes, species, items).
    ///
    /// Default: 24 hours
    pub document_ttl: Duration,

    /// TTL for everything else.
    ///
    /// Default: 1 hour
    pub default_ttl: Duration,

    /// Payload format version stamped on every write. Entries carrying a
    /// different version are treated as misses on read.
    pub schema_version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reference_ttl: Duration::from_secs(7 * 24 * 3600),
            document_ttl: Duration::from_secs(24 * 3600),
            default_ttl: Duration::from_secs(3600),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reference-data TTL.
    pub fn with_reference_ttl(mut self, ttl: Duration) -> Self {
        self.reference_ttl = ttl;
        self
    }

    /// Sets the rulebook-content TTL.
    pub fn with_document_ttl(mut self, ttl: Duration) -> Self {
        self.document_ttl = ttl;
        self
    }

    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Creates a config with no caching (zero TTLs).
    pub fn no_cache() -> Self {
        Self {
            reference_ttl: Duration::ZERO,
            document_ttl: Duration::ZERO,
            default_ttl: Duration::ZERO,
            ..Default::default()
        }
    }
}
