//! Search client: builds the site's search URL, fetches it, and extracts results.

use tracing::{info, instrument, warn};
use url::Url;

use super::ScrapeError;
use super::SearchResult;
use super::extractor::ResultExtractor;
use crate::fetch::PageFetcher;

/// Queries the book site's EPUB search page.
#[derive(Debug, Clone)]
pub struct SearchClient {
    fetcher: PageFetcher,
    extractor: ResultExtractor,
    base_url: Url,
}

impl SearchClient {
    /// Creates a client for the site rooted at `base_url`.
    #[must_use]
    pub fn new(fetcher: PageFetcher, base_url: Url) -> Self {
        Self {
            fetcher,
            extractor: ResultExtractor::new(base_url.clone()),
            base_url,
        }
    }

    /// Builds the first-page EPUB search URL for `query`.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!(
            "{base}/search?index=&page=1&sort=&ext=epub&display=&q={}",
            urlencoding::encode(query.trim())
        )
    }

    /// Runs a search and returns at most 20 results.
    ///
    /// An empty result list is a valid answer, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::SearchFailed`] carrying the underlying message when
    /// the page cannot be fetched.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ScrapeError> {
        let url = self.search_url(query);
        let page = self.fetcher.get_page(&url).await.map_err(|error| {
            warn!(error = %error, "search page fetch failed");
            ScrapeError::SearchFailed(error.to_string())
        })?;

        let results = self.extractor.extract(&page.body);
        info!(count = results.len(), "search results parsed");
        Ok(results)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query_and_filters_epub() {
        let client = SearchClient::new(
            PageFetcher::new().unwrap(),
            Url::parse("https://fr.annas-archive.org/").unwrap(),
        );
        let url = client.search_url("  le petit prince & co ");
        assert_eq!(
            url,
            "https://fr.annas-archive.org/search?index=&page=1&sort=&ext=epub&display=&q=le%20petit%20prince%20%26%20co"
        );
    }
}
