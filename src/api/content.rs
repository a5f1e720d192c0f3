//! Typed per-endpoint builders over the generic fetch surface.
//!
//! Each builder configures one request and is awaited directly via
//! `IntoFuture`. List builders resolve to [`Response<Vec<T>>`]; single
//! resource builders resolve to `Option<T>`, translating HTTP 404 into
//! `None` for optional lookups.

use std::future::Future;
use std::future::IntoFuture;
use std::marker::PhantomData;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::model::Armor;
use crate::model::Background;
use crate::model::CharacterClass;
use crate::model::Condition;
use crate::model::Document;
use crate::model::Feat;
use crate::model::MagicItem;
use crate::model::Species;
use crate::model::Spell;
use crate::model::Weapon;
use crate::params::QueryParams;
use crate::response::Response;
use crate::Open5eClient;

use super::FetchOptions;

/// Content category, selecting the cache TTL applied when no per-call
/// TTL is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCategory {
    /// Rarely-changing cross-document reference data (conditions).
    Reference,
    /// Rulebook content (spells, classes, species, items).
    Document,
    /// Everything else.
    Default,
}

impl Open5eClient {
    pub(crate) fn category_ttl(&self, category: CacheCategory) -> Duration {
        let config = &self.inner.cache_config;
        match category {
            CacheCategory::Reference => config.reference_ttl,
            CacheCategory::Document => config.document_ttl,
            CacheCategory::Default => config.default_ttl,
        }
    }

    // === Typed list endpoints ===

    /// Lists spells.
    pub fn spells(&self) -> ListBuilder<'_, Spell> {
        ListBuilder::new(self, "spells", CacheCategory::Document)
    }

    /// Lists character classes.
    pub fn classes(&self) -> ListBuilder<'_, CharacterClass> {
        ListBuilder::new(self, "classes", CacheCategory::Document)
    }

    /// Lists playable species.
    pub fn species(&self) -> ListBuilder<'_, Species> {
        ListBuilder::new(self, "species", CacheCategory::Document)
    }

    /// Lists backgrounds.
    pub fn backgrounds(&self) -> ListBuilder<'_, Background> {
        ListBuilder::new(self, "backgrounds", CacheCategory::Document)
    }

    /// Lists feats.
    pub fn feats(&self) -> ListBuilder<'_, Feat> {
        ListBuilder::new(self, "feats", CacheCategory::Document)
    }

    /// Lists conditions. Reference data; cached with the long TTL.
    pub fn conditions(&self) -> ListBuilder<'_, Condition> {
        ListBuilder::new(self, "conditions", CacheCategory::Reference)
    }

    /// Lists magic items.
    pub fn magic_items(&self) -> ListBuilder<'_, MagicItem> {
        ListBuilder::new(self, "magicitems", CacheCategory::Document)
    }

    /// Lists weapons.
    pub fn weapons(&self) -> ListBuilder<'_, Weapon> {
        ListBuilder::new(self, "weapons", CacheCategory::Document)
    }

    /// Lists armor.
    pub fn armor(&self) -> ListBuilder<'_, Armor> {
        ListBuilder::new(self, "armor", CacheCategory::Document)
    }

    /// Lists source documents (rulebooks).
    pub fn documents(&self) -> ListBuilder<'_, Document> {
        ListBuilder::new(self, "documents", CacheCategory::Reference)
    }

    // === Typed single-resource endpoints ===

    /// Fetches one spell by key. Resolves to `None` if it doesn't exist.
    pub fn spell(&self, key: &str) -> GetBuilder<'_, Spell> {
        GetBuilder::new(self, "spells", key, CacheCategory::Document)
    }

    /// Fetches one character class by key.
    pub fn character_class(&self, key: &str) -> GetBuilder<'_, CharacterClass> {
        GetBuilder::new(self, "classes", key, CacheCategory::Document)
    }

    /// Fetches one species by key.
    pub fn species_by_key(&self, key: &str) -> GetBuilder<'_, Species> {
        GetBuilder::new(self, "species", key, CacheCategory::Document)
    }

    /// Fetches one background by key.
    pub fn background(&self, key: &str) -> GetBuilder<'_, Background> {
        GetBuilder::new(self, "backgrounds", key, CacheCategory::Document)
    }

    /// Fetches one feat by key.
    pub fn feat(&self, key: &str) -> GetBuilder<'_, Feat> {
        GetBuilder::new(self, "feats", key, CacheCategory::Document)
    }

    /// Fetches one condition by key.
    pub fn condition(&self, key: &str) -> GetBuilder<'_, Condition> {
        GetBuilder::new(self, "conditions", key, CacheCategory::Reference)
    }

    /// Fetches one magic item by key.
    pub fn magic_item(&self, key: &str) -> GetBuilder<'_, MagicItem> {
        GetBuilder::new(self, "magicitems", key, CacheCategory::Document)
    }

    /// Fetches one source document by key.
    pub fn document(&self, key: &str) -> GetBuilder<'_, Document> {
        GetBuilder::new(self, "documents", key, CacheCategory::Reference)
    }
}

// =============================================================================
// ListBuilder
// =============================================================================

/// Builder for a cached, paginated list fetch of one endpoint.
///
/// # Example
///
/// ```ignore
/// let spells = client
///     .spells()
///     .document("wotc-srd")
///     .search("fire")
///     .await?;
/// println!("{} spells", spells.data().len());
/// ```
pub struct ListBuilder<'a, T> {
    client: &'a Open5eClient,
    endpoint: &'static str,
    category: CacheCategory,
    params: QueryParams,
    options: FetchOptions,
    bypass_cache: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> ListBuilder<'a, T>
where
    T: DeserializeOwned + Serialize,
{
    pub(crate) fn new(
        client: &'a Open5eClient,
        endpoint: &'static str,
        category: CacheCategory,
    ) -> Self {
        Self {
            client,
            endpoint,
            category,
            params: QueryParams::new(),
            options: FetchOptions::new(),
            bypass_cache: false,
            _marker: PhantomData,
        }
    }

    /// Scopes results to one source document (rulebook) and tags the
    /// cache entry with its key.
    pub fn document(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.params = self.params.set("document__key", key.as_str());
        self.options = self.options.document_key(key);
        self
    }

    /// Free-text search filter.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.params = self.params.set("search", text.into());
        self
    }

    /// Sets an arbitrary query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<crate::params::ParamValue>) -> Self {
        self.params = self.params.set(name, value);
        self
    }

    /// Overrides the page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.options = self.options.page_size(size);
        self
    }

    /// Overrides the cache TTL for this call.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.options = self.options.ttl(ttl);
        self
    }

    /// Overrides the retry count for this call.
    pub fn retries(mut self, retries: u32) -> Self {
        self.options = self.options.retries(retries);
        self
    }

    /// Skips the cache read but writes the fresh result back.
    pub fn force_refresh(mut self) -> Self {
        self.options = self.options.force_refresh();
        self
    }

    /// Bypasses the cache entirely (no read, no write).
    pub fn bypass_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }

    /// Attaches a cancellation token.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.options = self.options.cancel(token);
        self
    }

    /// Execute the request.
    pub async fn execute(self) -> Result<Response<Vec<T>>, Error> {
        let mut options = self.options;
        if self.bypass_cache {
            let results = self.client.fetch_all(self.endpoint, &self.params, &options).await?;
            return Ok(Response::new(results));
        }
        if options.ttl.is_none() {
            options.ttl = Some(self.client.category_ttl(self.category));
        }
        self.client
            .fetch_all_cached(self.endpoint, &self.params, &options)
            .await
    }
}

impl<'a, T> IntoFuture for ListBuilder<'a, T>
where
    T: DeserializeOwned + Serialize + Send + 'a,
{
    type Output = Result<Response<Vec<T>>, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

// =============================================================================
// GetBuilder
// =============================================================================

/// Builder for a cached single-resource fetch.
///
/// Awaiting resolves to `Ok(None)` when the API answers 404, so callers
/// can treat missing content as an ordinary absent value; every other
/// failure propagates as an error.
pub struct GetBuilder<'a, T> {
    client: &'a Open5eClient,
    endpoint: String,
    category: CacheCategory,
    options: FetchOptions,
    bypass_cache: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> GetBuilder<'a, T>
where
    T: DeserializeOwned + Serialize,
{
    pub(crate) fn new(
        client: &'a Open5eClient,
        base: &str,
        key: &str,
        category: CacheCategory,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/{}", base, key.trim_matches('/')),
            category,
            options: FetchOptions::new(),
            bypass_cache: false,
            _marker: PhantomData,
        }
    }

    /// Overrides the cache TTL for this call.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.options = self.options.ttl(ttl);
        self
    }

    /// Overrides the retry count for this call.
    pub fn retries(mut self, retries: u32) -> Self {
        self.options = self.options.retries(retries);
        self
    }

    /// Skips the cache read but writes the fresh result back.
    pub fn force_refresh(mut self) -> Self {
        self.options = self.options.force_refresh();
        self
    }

    /// Bypasses the cache entirely (no read, no write).
    pub fn bypass_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }

    /// Attaches a cancellation token.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.options = self.options.cancel(token);
        self
    }

    /// Execute the request.
    pub async fn execute(self) -> Result<Option<T>, Error> {
        let mut options = self.options;
        let params = QueryParams::new();

        let result = if self.bypass_cache {
            self.client
                .fetch(&self.endpoint, &params, &options)
                .await
                .map(Response::new)
        } else {
            if options.ttl.is_none() {
                options.ttl = Some(self.client.category_ttl(self.category));
            }
            self.client.fetch_cached(&self.endpoint, &params, &options).await
        };

        match result {
            Ok(response) => Ok(Some(response.into_inner())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<'a, T> IntoFuture for GetBuilder<'a, T>
where
    T: DeserializeOwned + Serialize + Send + 'a,
{
    type Output = Result<Option<T>, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
