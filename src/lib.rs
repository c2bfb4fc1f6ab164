//! Shelfkeeper Core Library
//!
//! Backend for a small shared EPUB library: searches a third-party book site,
//! downloads and validates EPUB files, shelves them in storage with a catalog
//! row, and gates new reader accounts behind admin approval by email.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Outbound HTTP with browser identity, timeouts and a payload cap
//! - [`scrape`] - Search result extraction and download link resolution
//! - [`validate`] - EPUB payload checks (content type, ZIP signature)
//! - [`library`] - Catalog, object storage and the ingestion pipeline
//! - [`approval`] - Approval tokens and the approve/reject workflow
//! - [`notify`] - Transactional email through Resend
//! - [`api`] - axum router, handlers and HTML pages
//! - [`db`] - Database connection and schema management
//! - [`config`] - Validated server configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod approval;
pub mod config;
pub mod db;
pub mod fetch;
pub mod library;
pub mod notify;
pub mod scrape;
pub mod validate;

mod user_agent;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use fetch::{FetchError, PageFetcher};
pub use library::{Book, BookMetadata, IngestError, IngestOutcome, Ingestor};
pub use scrape::{ScrapeError, SearchClient, SearchResult};
pub use user_agent::BROWSER_USER_AGENT;
pub use validate::{ContentMismatch, EPUB_SIGNATURE, validate_payload};
