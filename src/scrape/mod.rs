//! Scraping of the third-party book site: search results and download links.
//!
//! # Architecture
//!
//! - [`ResultExtractor`] - Data-driven extraction of [`SearchResult`]s from markup
//! - [`SearchClient`] - Builds the search URL, fetches, extracts
//! - [`DownloadResolver`] - Detail page → mirror page → final file link
//!
//! Nothing here is a contract with the site: selectors are heuristics kept in
//! tables so markup drift is a data change.

mod extractor;
mod resolver;
mod search;
pub mod utils;

pub use extractor::{
    AUTHOR_RULE, COVER_RULE, FILE_SIZE_RULE, FieldRule, LANGUAGE_RULE, ResultExtractor,
    TITLE_STRATEGIES, TitleStrategy, YEAR_RULE,
};
pub use resolver::{DownloadResolver, ResolvedDownload, collect_download_links, pick_final_link};
pub use search::SearchClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetchError;

/// Origin of the scraped site.
pub const DEFAULT_SITE_URL: &str = "https://fr.annas-archive.org";

/// Source tag attached to every result.
pub const SOURCE_NAME: &str = "annas-archive";

/// Maximum results returned per search.
pub const MAX_RESULTS: usize = 20;

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Author used when none can be found near the result.
pub const DEFAULT_AUTHOR: &str = "unknown";

/// Language tag used when none can be found near the result.
pub const DEFAULT_LANGUAGE: &str = "fr";

/// One candidate book from a search page. Ephemeral; never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Title, at most 200 characters.
    pub title: String,
    /// Author, `"unknown"` when not found.
    pub author: String,
    /// Publication year as displayed.
    pub year: Option<String>,
    /// Language tag, `"fr"` when not found.
    pub language: String,
    /// Human-readable file size as displayed.
    pub file_size: Option<String>,
    /// Absolute cover image URL.
    pub cover_url: Option<String>,
    /// Absolute book-detail page URL.
    pub book_url: String,
    /// Source tag (`"annas-archive"`).
    pub source: String,
    /// Content identifier parsed from the detail path; the dedup key.
    pub content_id: String,
}

/// Errors raised while scraping the book site.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The search page could not be fetched or parsed.
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// The detail page had no usable download link.
    #[error("no download link found on {url}")]
    NoDownloadLink {
        /// The detail page URL.
        url: String,
    },

    /// A detail or mirror page fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
