//! API error types

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("HTTP {status} from '{endpoint}': {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message (status text or response body).
        message: String,
        /// The endpoint that produced the error.
        endpoint: String,
    },

    /// Network error during the API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL built from the base URL and endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the API response body.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// Pagination exceeded the configured page cap.
    ///
    /// Only raised when a `max_pages` limit is explicitly configured;
    /// by default pagination follows `next` links without bound.
    #[error("Pagination for '{endpoint}' exceeded {pages} pages")]
    PageLimit {
        /// The endpoint being paginated.
        endpoint: String,
        /// The configured page cap.
        pages: u32,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    ///
    /// 429 and 5xx responses indicate throttling or transient server
    /// trouble; other 4xx responses will not be fixed by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Network(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::http(429, "rate limited", "spells").is_retryable());
        assert!(ApiError::http(500, "oops", "spells").is_retryable());
        assert!(ApiError::http(503, "down", "spells").is_retryable());
        assert!(!ApiError::http(404, "not found", "spells").is_retryable());
        assert!(!ApiError::http(400, "bad request", "spells").is_retryable());
    }

    #[test]
    fn test_http_error_message_carries_endpoint_and_status() {
        let err = ApiError::http(404, "Not Found", "classes/wizard");
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("classes/wizard"));
    }
}
