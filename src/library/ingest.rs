//! Book ingestion: duplicate check, download, validation, upload, catalog insert.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::{Book, BookCatalog, BookMetadata, LibraryError, ObjectStore, storage_filename};
use crate::fetch::{FetchError, FetchedPayload, PageFetcher};
use crate::scrape::{DownloadResolver, ScrapeError};
use crate::validate::{ContentMismatch, validate_payload};

/// Content type recorded for stored books.
pub const EPUB_CONTENT_TYPE: &str = "application/epub+zip";

/// A freshly shelved book and where readers can fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelvedBook {
    pub book: Book,
    pub file_url: String,
}

/// Result of an ingestion attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The book was downloaded, stored, and cataloged.
    Added(ShelvedBook),
    /// A book with a matching title is already cataloged; nothing was downloaded.
    AlreadyInLibrary(Book),
}

/// Errors raised while ingesting a book.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No download link could be resolved from the detail page.
    #[error(transparent)]
    Resolve(#[from] ScrapeError),

    /// The payload could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The payload is not an EPUB.
    #[error(transparent)]
    ContentMismatch(#[from] ContentMismatch),

    /// The duplicate check could not run.
    #[error("duplicate check failed: {0}")]
    Lookup(#[source] LibraryError),

    /// Writing the object failed.
    #[error("upload of {filename} failed: {source}")]
    Upload {
        filename: String,
        #[source]
        source: LibraryError,
    },

    /// Inserting the row failed after the upload.
    #[error("database insert failed for {filename}: {source}")]
    Persist {
        filename: String,
        #[source]
        source: LibraryError,
    },
}

/// Adds books to the library.
#[derive(Clone)]
pub struct Ingestor {
    fetcher: PageFetcher,
    resolver: DownloadResolver,
    catalog: Arc<dyn BookCatalog>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor").finish_non_exhaustive()
    }
}

impl Ingestor {
    #[must_use]
    pub fn new(
        fetcher: PageFetcher,
        catalog: Arc<dyn BookCatalog>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            resolver: DownloadResolver::new(fetcher.clone()),
            fetcher,
            catalog,
            store,
        }
    }

    /// Adds the book behind a detail page URL.
    ///
    /// # Errors
    ///
    /// See [`IngestError`]. A duplicate is not an error.
    #[instrument(skip(self, metadata), fields(title = ?metadata.title()))]
    pub async fn ingest_from_detail_page(
        &self,
        book_url: &str,
        metadata: &BookMetadata,
    ) -> Result<IngestOutcome, IngestError> {
        if let Some(existing) = self.find_duplicate(metadata).await? {
            return Ok(IngestOutcome::AlreadyInLibrary(existing));
        }

        let resolved = self.resolver.resolve(book_url).await?;
        let payload = self.download_validated(&resolved.download_url).await?;
        let shelved = self.shelve(payload, metadata, None).await?;
        Ok(IngestOutcome::Added(shelved))
    }

    /// Adds the book at a direct download URL on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// See [`IngestError`]. A duplicate is not an error.
    #[instrument(skip(self, metadata), fields(title = ?metadata.title()))]
    pub async fn ingest_from_direct_url(
        &self,
        download_url: &str,
        metadata: &BookMetadata,
        user_id: &str,
    ) -> Result<IngestOutcome, IngestError> {
        if let Some(existing) = self.find_duplicate(metadata).await? {
            return Ok(IngestOutcome::AlreadyInLibrary(existing));
        }

        let payload = self.download_validated(download_url).await?;
        let shelved = self.shelve(payload, metadata, Some(user_id)).await?;
        Ok(IngestOutcome::Added(shelved))
    }

    async fn find_duplicate(&self, metadata: &BookMetadata) -> Result<Option<Book>, IngestError> {
        let Some(title) = metadata.title() else {
            return Ok(None);
        };
        let existing = self
            .catalog
            .find_by_title_fragment(title)
            .await
            .map_err(IngestError::Lookup)?;
        if let Some(book) = &existing {
            info!(existing_id = book.id, "book already in library");
        }
        Ok(existing)
    }

    async fn download_validated(&self, url: &str) -> Result<FetchedPayload, IngestError> {
        let payload = self.fetcher.get_binary(url).await?;
        if let Err(mismatch) = validate_payload(payload.content_type.as_deref(), &payload.bytes) {
            warn!(url = %payload.url, error = %mismatch, "rejected downloaded payload");
            return Err(mismatch.into());
        }
        Ok(payload)
    }

    async fn shelve(
        &self,
        payload: FetchedPayload,
        metadata: &BookMetadata,
        added_by: Option<&str>,
    ) -> Result<ShelvedBook, IngestError> {
        let filename = storage_filename(metadata.title(), Utc::now().timestamp_millis());
        let file_size = i64::try_from(payload.bytes.len()).unwrap_or(i64::MAX);

        self.store
            .put(&filename, &payload.bytes, EPUB_CONTENT_TYPE)
            .await
            .map_err(|source| IngestError::Upload {
                filename: filename.clone(),
                source,
            })?;

        let row = metadata.to_new_book(filename.clone(), file_size, added_by);
        let book = match self.catalog.insert(&row).await {
            Ok(book) => book,
            Err(source) => {
                if let Err(cleanup) = self.store.remove(&filename).await {
                    warn!(filename = %filename, error = %cleanup, "failed to remove orphaned object");
                }
                return Err(IngestError::Persist { filename, source });
            }
        };

        info!(id = book.id, filename = %book.filename, bytes = file_size, "book added to library");
        Ok(ShelvedBook {
            file_url: self.store.public_url(&book.filename),
            book,
        })
    }
}
