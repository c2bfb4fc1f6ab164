//! The shared book library: catalog rows, stored objects, and ingestion.
//!
//! # Architecture
//!
//! - [`BookCatalog`] - Persistence seam for book rows ([`SqliteCatalog`] in production)
//! - [`ObjectStore`] - Write-once blob storage ([`FsObjectStore`] in production)
//! - [`Ingestor`] - Duplicate check → download → validate → upload → insert
//!
//! A book's object and its row are created as a pair. If the row insert fails
//! after the upload, the object is deleted again (best effort).

mod catalog;
mod filename;
mod ingest;
mod storage;

pub use catalog::{BookCatalog, SqliteCatalog, fold_title};
pub use filename::{BOOK_FILE_EXTENSION, DEFAULT_SLUG, MAX_SLUG_CHARS, slugify_title, storage_filename};
pub use ingest::{EPUB_CONTENT_TYPE, IngestError, IngestOutcome, Ingestor, ShelvedBook};
pub use storage::{FsObjectStore, ObjectStore};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Row title used when the caller supplied none.
pub const UNTITLED: &str = "Untitled";

/// A book persisted in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
    /// Database primary key.
    pub id: i64,
    /// Display title (`"Untitled"` when none was given).
    pub title: String,
    /// Author as supplied by the caller.
    pub author: Option<String>,
    /// Object key in the store.
    pub filename: String,
    /// Absolute cover image URL.
    pub cover_url: Option<String>,
    /// Stored payload size in bytes.
    pub file_size: i64,
    /// Language tag as supplied by the caller.
    pub language: Option<String>,
    /// Publication year.
    pub year: Option<i64>,
    /// User who supplied the download URL, for direct-URL ingestion.
    pub added_by: Option<String>,
    /// Insert time, RFC 3339 UTC.
    pub created_at: String,
}

/// Values for a catalog insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    /// Display title, already defaulted.
    pub title: String,
    /// Author, if known.
    pub author: Option<String>,
    /// Object key the payload was stored under.
    pub filename: String,
    /// Absolute cover image URL.
    pub cover_url: Option<String>,
    /// Payload size in bytes.
    pub file_size: i64,
    /// Language tag, if known.
    pub language: Option<String>,
    /// Publication year, if it parsed.
    pub year: Option<i64>,
    /// Requesting user for direct-URL ingestion.
    pub added_by: Option<String>,
}

/// Caller-supplied description of a book being added.
///
/// Every field is optional. `year` accepts a JSON string or number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<String>,
    pub cover_url: Option<String>,
}

impl BookMetadata {
    /// Trimmed, non-empty title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// Builds the catalog insert for an uploaded object.
    #[must_use]
    pub fn to_new_book(&self, filename: String, file_size: i64, added_by: Option<&str>) -> NewBook {
        NewBook {
            title: self.title().unwrap_or(UNTITLED).to_string(),
            author: non_empty(self.author.as_deref()).map(str::to_string),
            filename,
            cover_url: non_empty(self.cover_url.as_deref()).map(str::to_string),
            file_size,
            language: non_empty(self.language.as_deref()).map(str::to_string),
            year: self.year.as_deref().and_then(parse_year),
            added_by: added_by.map(str::to_string),
        }
    }
}

/// Parses the leading integer of a year string (`"1949"`, `"1949 (reprint)"`).
#[must_use]
pub fn parse_year(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|year| sign * year)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Errors from the catalog or object store.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// A catalog query failed.
    #[error("library database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading or writing an object failed.
    #[error("storage error for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store already holds an object under this key.
    #[error("object {key} already exists")]
    ObjectExists { key: String },

    /// The key is not a single flat filename.
    #[error("invalid object key: {key:?}")]
    InvalidKey { key: String },
}

impl LibraryError {
    /// Creates a storage error for `key`.
    pub fn storage(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            key: key.into(),
            source,
        }
    }
}
