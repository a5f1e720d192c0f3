//! Pagination aggregation for list endpoints.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::error::Error;
use crate::params::QueryParams;
use crate::Open5eClient;

use super::FetchOptions;

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    /// Total number of results across all pages.
    pub count: u64,
    /// URL of the next page, or `None` on the last page.
    pub next: Option<String>,
    /// URL of the previous page, or `None` on the first page.
    pub previous: Option<String>,
    /// The results on this page.
    pub results: Vec<T>,
}

impl Open5eClient {
    /// Fetches every page of a list endpoint and returns the flattened
    /// results, in page order.
    ///
    /// Pages are requested strictly sequentially via `page`/`limit`
    /// parameters, each page competing for a queue slot on its own, and
    /// the walk continues while the response's `next` field is non-null.
    /// A failure on any page fails the whole call; nothing partial is
    /// returned.
    ///
    /// By default the walk is unbounded; a client built with
    /// `max_pages(n)` fails with [`ApiError::PageLimit`] if the `next`
    /// chain exceeds `n` pages.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        options: &FetchOptions,
    ) -> Result<Vec<T>, Error> {
        let page_size = options.page_size.unwrap_or(self.inner.default_page_size);
        let mut results = Vec::new();
        let mut page: u32 = 1;

        loop {
            if let Some(cap) = self.inner.max_pages {
                if page > cap {
                    return Err(Error::Api(ApiError::PageLimit {
                        endpoint: endpoint.to_string(),
                        pages: cap,
                    }));
                }
            }

            let page_params = params.merged_with(
                &QueryParams::new().set("page", page).set("limit", page_size),
            );
            let body: Paginated<T> = self.fetch(endpoint, &page_params, options).await?;

            tracing::trace!(endpoint, page, received = body.results.len(), "fetched page");
            results.extend(body.results);

            if body.next.is_some() {
                page += 1;
            } else {
                break;
            }
        }

        Ok(results)
    }
}
