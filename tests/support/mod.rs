//! Shared fixtures for integration tests: EPUB bytes, fakes for the trait seams.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use shelfkeeper_core::fetch::PageFetcher;
use shelfkeeper_core::library::{Book, BookCatalog, BookMetadata, LibraryError, NewBook};
use shelfkeeper_core::notify::{MailError, Mailer, OutgoingEmail};
use shelfkeeper_core::EPUB_SIGNATURE;

/// Minimal payload that passes validation: ZIP signature plus the EPUB mimetype entry.
pub fn epub_bytes() -> Vec<u8> {
    let mut bytes = EPUB_SIGNATURE.to_vec();
    bytes.extend_from_slice(b"\x14\x00\x00\x00\x00\x00mimetypeapplication/epub+zip");
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

/// Fetcher with short budgets so failure tests finish quickly.
pub fn test_fetcher() -> PageFetcher {
    PageFetcher::with_limits(Duration::from_secs(2), Duration::from_secs(2), 1024 * 1024)
        .expect("fetcher builds")
}

pub fn metadata(title: &str) -> BookMetadata {
    BookMetadata {
        title: Some(title.to_string()),
        author: Some("Frank Herbert".to_string()),
        language: Some("en".to_string()),
        year: Some("1965".to_string()),
        cover_url: None,
    }
}

/// Mailer that records every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the attempt, then fails it.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        let mut sent = self.sent.lock().expect("mailer lock");
        sent.push(email.clone());
        if self.fail {
            return Err(MailError::Rejected {
                status: 500,
                message: "provider down".to_string(),
            });
        }
        Ok(format!("email-{}", sent.len()))
    }
}

/// Catalog with no books whose inserts always fail.
#[derive(Debug, Default)]
pub struct FailingCatalog;

#[async_trait]
impl BookCatalog for FailingCatalog {
    async fn find_by_title_fragment(&self, _fragment: &str) -> Result<Option<Book>, LibraryError> {
        Ok(None)
    }

    async fn insert(&self, _book: &NewBook) -> Result<Book, LibraryError> {
        Err(LibraryError::Database(sqlx::Error::PoolClosed))
    }
}
