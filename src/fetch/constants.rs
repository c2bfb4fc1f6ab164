//! Constants for the fetch module (timeouts, payload cap).

use std::time::Duration;

/// TCP connect timeout shared by page and binary fetches.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-request timeout for HTML pages (search results, detail and mirror pages).
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-request timeout for binary downloads.
pub const BINARY_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest binary payload accepted (50 MiB).
pub const MAX_PAYLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Redirect hops followed before a fetch is abandoned.
pub const MAX_REDIRECTS: usize = 5;
