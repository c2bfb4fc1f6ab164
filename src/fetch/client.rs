//! HTTP client wrapper for page and binary fetches.
//!
//! `PageFetcher` is created once at startup and shared; it owns the reqwest
//! connection pool and applies per-request timeouts so pages and binaries can
//! use different budgets on the same client.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, redirect};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{
    BINARY_TIMEOUT, CONNECT_TIMEOUT, MAX_PAYLOAD_BYTES, MAX_REDIRECTS, PAGE_TIMEOUT,
};
use super::error::FetchError;
use crate::user_agent::BROWSER_USER_AGENT;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// An HTML page fetched over HTTP.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links on the page resolve against it.
    pub url: Url,
    /// Response body decoded as text.
    pub body: String,
}

/// A binary payload fetched over HTTP, held in memory.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    /// Final URL after redirects.
    pub url: Url,
    /// Raw `Content-Type` header value, if the server sent one.
    pub content_type: Option<String>,
    /// Payload bytes (never larger than the configured cap).
    pub bytes: Vec<u8>,
}

/// Outbound HTTP client with fixed browser identity, timeouts, and a payload cap.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    page_timeout: Duration,
    binary_timeout: Duration,
    max_payload_bytes: u64,
}

impl PageFetcher {
    /// Creates a fetcher with the default budgets (10s pages, 60s binaries, 50 MiB).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the reqwest client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_limits(PAGE_TIMEOUT, BINARY_TIMEOUT, MAX_PAYLOAD_BYTES)
    }

    /// Creates a fetcher with explicit budgets.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the reqwest client cannot be built.
    pub fn with_limits(
        page_timeout: Duration,
        binary_timeout: Duration,
        max_payload_bytes: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            page_timeout,
            binary_timeout,
            max_payload_bytes,
        })
    }

    /// Returns the payload cap in bytes.
    #[must_use]
    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_bytes
    }

    /// Fetches an HTML page as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on malformed URLs, transport failures, timeouts,
    /// and non-success statuses.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = parse_http_url(url)?;
        let response = self
            .send(parsed, self.page_timeout, Some(HTML_ACCEPT))
            .await?;

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        debug!(bytes = body.len(), final_url = %final_url, "page fetched");
        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }

    /// Fetches a binary payload into memory, enforcing the size cap.
    ///
    /// The cap is checked against `Content-Length` before reading and against the
    /// running byte count while streaming, so servers that omit or understate the
    /// length are cut off as soon as they cross it.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::TooLarge`] when the payload crosses the cap, and the
    /// same transport errors as [`get_page`](Self::get_page).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_binary(&self, url: &str) -> Result<FetchedPayload, FetchError> {
        let parsed = parse_http_url(url)?;
        let response = self.send(parsed, self.binary_timeout, None).await?;

        if response
            .content_length()
            .is_some_and(|len| len > self.max_payload_bytes)
        {
            return Err(FetchError::too_large(url, self.max_payload_bytes));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);

        let bytes = self.read_capped(response, url).await?;

        info!(
            bytes = bytes.len(),
            content_type = content_type.as_deref().unwrap_or("unknown"),
            "payload fetched"
        );
        Ok(FetchedPayload {
            url: final_url,
            content_type,
            bytes,
        })
    }

    async fn send(
        &self,
        url: Url,
        timeout: Duration,
        accept: Option<&str>,
    ) -> Result<Response, FetchError> {
        let url_text = url.to_string();
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url_text, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url_text, status.as_u16()));
        }
        Ok(response)
    }

    async fn read_capped(&self, response: Response, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut stream = response.bytes_stream();
        let mut bytes = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::from_reqwest(url, e))?;
            if (bytes.len() + chunk.len()) as u64 > self.max_payload_bytes {
                return Err(FetchError::too_large(url, self.max_payload_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}

/// Parses `url` and rejects anything that is not HTTP(S).
fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|_| FetchError::invalid_url(url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::invalid_url(url));
    }
    Ok(parsed)
}
