//! Error types

mod api;
mod cache;

pub use api::*;
pub use cache::*;

/// Top-level error type for the Open5E client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the upstream API or the network.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Error from the local cache store.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The request was cancelled via its cancellation token.
    ///
    /// Cancellation is surfaced immediately and is never retried.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// Returns the HTTP status code if this wraps an HTTP error response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
            _ => None,
        }
    }

    /// Returns `true` if this error is an HTTP 404 from the API.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}
