//! Download-link resolution: book-detail page → mirror page → final file link.
//!
//! This is a heuristic over markup the site does not promise to keep stable:
//! the last non-premium download link on the detail page is taken as the free
//! mirror, and the last download-looking anchor on the mirror is the file.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::ScrapeError;
use super::utils::{absolutize_url, compile_static_selector, href_has_extension};
use crate::fetch::PageFetcher;

static DOWNLOAD_ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"a[href*="download"]"#));
static ANY_ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a[href]"));

/// Href substrings marking paid or donation links on the detail page.
const EXCLUDED_HREF_MARKERS: [&str; 2] = ["donate", "premium"];

/// Visible-text phrases that mark a download button on the mirror page.
const DOWNLOAD_PHRASES: [&str; 2] = ["download", "télécharger"];

/// Expected file extension of the final link.
const BOOK_EXTENSION: &str = ".epub";

/// Links discovered while resolving a book-detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    /// The mirror page chosen from the detail page.
    pub mirror_url: String,
    /// The link believed to serve the file (may equal `mirror_url`).
    pub download_url: String,
}

/// Follows a book-detail page to its final download link.
#[derive(Debug, Clone)]
pub struct DownloadResolver {
    fetcher: PageFetcher,
}

impl DownloadResolver {
    /// Creates a resolver sharing `fetcher`'s connection pool.
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Resolves `book_url` to a download link, fetching the detail and mirror pages.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::NoDownloadLink`] if the detail page has no usable
    /// download anchors, and [`ScrapeError::Fetch`] if either page fetch fails.
    #[instrument(skip(self), fields(book_url = %book_url))]
    pub async fn resolve(&self, book_url: &str) -> Result<ResolvedDownload, ScrapeError> {
        let detail = self.fetcher.get_page(book_url).await?;
        let mirror_url = collect_download_links(&detail.body, &detail.url)
            .pop()
            .ok_or_else(|| ScrapeError::NoDownloadLink {
                url: book_url.to_string(),
            })?;
        debug!(mirror_url = %mirror_url, "mirror selected");

        let mirror = self.fetcher.get_page(&mirror_url).await?;
        let download_url =
            pick_final_link(&mirror.body, &mirror.url).unwrap_or_else(|| mirror_url.clone());

        info!(download_url = %download_url, "download link resolved");
        Ok(ResolvedDownload {
            mirror_url,
            download_url,
        })
    }
}

/// Collects absolute download links from a detail page, in document order,
/// skipping donation and premium links.
#[must_use]
pub fn collect_download_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&DOWNLOAD_ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !EXCLUDED_HREF_MARKERS.iter().any(|m| href.contains(m)))
        .filter_map(|href| absolutize_url(href, page_url))
        .collect()
}

/// Picks the last anchor on a mirror page whose text reads like a download
/// button or whose href ends in `.epub`.
#[must_use]
pub fn pick_final_link(html: &str, page_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANY_ANCHOR_SELECTOR)
        .filter(|anchor| is_download_anchor(*anchor))
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| absolutize_url(href, page_url))
        .last()
}

fn is_download_anchor(anchor: ElementRef<'_>) -> bool {
    let text = anchor.text().collect::<String>().to_lowercase();
    let href = anchor.value().attr("href").unwrap_or_default();
    DOWNLOAD_PHRASES.iter().any(|phrase| text.contains(phrase))
        || href_has_extension(href, BOOK_EXTENSION)
}
