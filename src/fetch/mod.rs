//! Outbound HTTP fetching for scraped pages and book payloads.
//!
//! # Features
//!
//! - Fixed browser User-Agent on every request
//! - Separate budgets: 10s for HTML pages, 60s for binary downloads
//! - 50 MiB payload cap enforced while streaming
//! - No retries: a transport failure propagates immediately
//!
//! # Example
//!
//! ```no_run
//! use shelfkeeper_core::fetch::PageFetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = PageFetcher::new()?;
//! let page = fetcher.get_page("https://fr.annas-archive.org/search?q=1984").await?;
//! println!("{} bytes of markup", page.body.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;

pub use client::{FetchedPage, FetchedPayload, PageFetcher};
pub use constants::{BINARY_TIMEOUT, MAX_PAYLOAD_BYTES, PAGE_TIMEOUT};
pub use error::FetchError;
