//! Error types for the fetch module.
//!
//! Every variant carries the URL that failed so callers can pass the message
//! straight through to API clients.

use thiserror::Error;

/// Errors that can occur while fetching pages or binary payloads.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The provided URL is malformed or not HTTP(S).
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, body read).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Payload exceeded the configured size cap.
    #[error("payload from {url} exceeds the {limit_bytes} byte limit")]
    TooLarge {
        /// The URL whose payload was too large.
        url: String,
        /// The configured cap in bytes.
        limit_bytes: u64,
    },
}

impl FetchError {
    /// Creates a network error, promoting reqwest timeouts to [`FetchError::Timeout`].
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a size-limit error.
    pub fn too_large(url: impl Into<String>, limit_bytes: u64) -> Self {
        Self::TooLarge {
            url: url.into(),
            limit_bytes,
        }
    }
}
