//! Single-request execution with retry and backoff.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::ApiError;
use crate::error::Error;
use crate::params::QueryParams;
use crate::Open5eClient;

/// Per-call options for fetch operations.
///
/// All fields default to "use the client's configuration".
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use open5e_client::api::FetchOptions;
///
/// let options = FetchOptions::new()
///     .retries(1)
///     .document_key("wotc-srd")
///     .ttl(Duration::from_secs(604_800))
///     .force_refresh();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Retry count override for this call.
    pub retries: Option<u32>,
    /// Bypass the request queue (no concurrency slot, no batch cadence).
    pub skip_queue: bool,
    /// Cancellation token; cancellation is honored by the retry loop but
    /// the queue is unaware of it.
    pub cancel: Option<CancellationToken>,
    /// Page size override for paginated fetches.
    pub page_size: Option<usize>,
    /// Document key tag written to cache entries.
    pub document_key: Option<String>,
    /// TTL override for cache writes.
    pub ttl: Option<Duration>,
    /// Skip the cache read but still write the fresh result back.
    pub force_refresh: bool,
}

impl FetchOptions {
    /// Creates options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the retry count for this call.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Bypasses the request queue for this call.
    pub fn skip_queue(mut self) -> Self {
        self.skip_queue = true;
        self
    }

    /// Attaches a cancellation token.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Overrides the page size for paginated fetches.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Tags cache writes with a document key.
    pub fn document_key(mut self, key: impl Into<String>) -> Self {
        self.document_key = Some(key.into());
        self
    }

    /// Overrides the cache TTL for this call.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Skips the cache read; the fresh result is still written back.
    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

impl Open5eClient {
    /// Performs one uncached, unpaginated API call.
    ///
    /// The request runs through the concurrency queue (unless
    /// `skip_queue`) and is retried per the client's
    /// [`RetryConfig`](crate::rate_limit::RetryConfig): 429, 5xx, and
    /// network errors back off exponentially; other 4xx responses fail
    /// immediately. On success the JSON body is decoded into `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        options: &FetchOptions,
    ) -> Result<T, Error> {
        let fut = self.fetch_with_retry(endpoint, params, options);
        if options.skip_queue {
            fut.await
        } else {
            self.inner.queue.run(fut).await
        }
    }

    /// Builds the request URL: base joined with the slash-trimmed
    /// endpoint plus a trailing slash, with params appended in insertion
    /// order. Absent (`None`) params were never inserted, so they do not
    /// appear.
    pub(crate) fn build_url(&self, endpoint: &str, params: &QueryParams) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}/",
            self.inner.base_url.trim_end_matches('/'),
            endpoint.trim_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params.iter() {
                pairs.append_pair(name, &value.to_string());
            }
        }

        Ok(url)
    }

    /// Executes one logical API call with bounded retries.
    ///
    /// The attempt loop runs `retries + 1` times. Always either returns a
    /// decoded value or an error; cancellation short-circuits with
    /// [`Error::Cancelled`] and is never retried.
    async fn fetch_with_retry<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        options: &FetchOptions,
    ) -> Result<T, Error> {
        let url = self.build_url(endpoint, params)?;
        let retry_config = &self.inner.retry_config;
        let retries = options.retries.unwrap_or(retry_config.max_retries);

        let mut attempt = 0u32;
        loop {
            if let Some(token) = &options.cancel {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }

            match self.send_request(&url, options.cancel.as_ref()).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await.map_err(ApiError::from)?;
                        return serde_json::from_slice(&bytes).map_err(|e| {
                            Error::Api(ApiError::parse_with_body(
                                e.to_string(),
                                String::from_utf8_lossy(&bytes).into_owned(),
                            ))
                        });
                    }

                    let code = status.as_u16();
                    let retryable = (code == 429 && retry_config.retry_on_429)
                        || (status.is_server_error() && retry_config.retry_on_5xx);

                    if !retryable || attempt >= retries {
                        let message = match status.canonical_reason() {
                            Some(reason) => reason.to_string(),
                            None => response.text().await.unwrap_or_default(),
                        };
                        return Err(Error::Api(ApiError::http(code, message, endpoint)));
                    }

                    tracing::debug!(endpoint, status = code, attempt, "retrying after HTTP error");
                }
                Err(Error::Api(ApiError::Network(e))) => {
                    if !retry_config.retry_on_network || attempt >= retries {
                        return Err(Error::Api(ApiError::Network(e)));
                    }
                    tracing::debug!(endpoint, error = %e, attempt, "retrying after network error");
                }
                Err(e) => return Err(e),
            }

            let delay = retry_config.backoff_delay(attempt);
            self.backoff(delay, options.cancel.as_ref()).await?;
            attempt += 1;
        }
    }

    /// Sends one HTTP GET, racing it against cancellation.
    async fn send_request(
        &self,
        url: &Url,
        cancel: Option<&CancellationToken>,
    ) -> Result<reqwest::Response, Error> {
        let mut request = self.inner.http_client.get(url.clone());
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let send = request.send();
        let result = match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(Error::Cancelled),
                    result = send => result,
                }
            }
            None => send.await,
        };

        result.map_err(|e| Error::Api(ApiError::Network(e)))
    }

    /// Sleeps for the backoff delay, aborting early on cancellation.
    async fn backoff(
        &self,
        delay: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), Error> {
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(Error::Cancelled),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_and_appends_params() {
        let client = Open5eClient::builder()
            .base_url("https://api.open5e.com/v2/")
            .build();
        let params = QueryParams::new()
            .set("document__key", "wotc-srd")
            .set("limit", 50i64);
        let url = client.build_url("/spells/", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.open5e.com/v2/spells/?document__key=wotc-srd&limit=50"
        );
    }

    #[test]
    fn test_build_url_no_params() {
        let client = Open5eClient::builder()
            .base_url("http://127.0.0.1:1234")
            .build();
        let url = client.build_url("classes", &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1234/classes/");
    }

    #[test]
    fn test_build_url_skips_absent_params() {
        let client = Open5eClient::new();
        let params = QueryParams::new()
            .set("search", "fire")
            .set_opt("document__key", None::<&str>);
        let url = client.build_url("spells", &params).unwrap();
        assert_eq!(url.query(), Some("search=fire"));
    }
}
