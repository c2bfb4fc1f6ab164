//! Catalog seam for book rows, with the SQLite implementation.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{Book, LibraryError, NewBook};
use crate::db::Database;

/// Data-access contract for the book catalog.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Returns the first book whose title contains `fragment`, ignoring case.
    async fn find_by_title_fragment(&self, fragment: &str) -> Result<Option<Book>, LibraryError>;

    /// Inserts a row and returns it as stored.
    async fn insert(&self, book: &NewBook) -> Result<Book, LibraryError>;
}

/// Catalog backed by the `books` table.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    db: Database,
}

impl SqliteCatalog {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookCatalog for SqliteCatalog {
    #[instrument(skip(self))]
    async fn find_by_title_fragment(&self, fragment: &str) -> Result<Option<Book>, LibraryError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE instr(title_folded, ?) > 0 ORDER BY id LIMIT 1",
        )
        .bind(fold_title(fragment))
        .fetch_optional(self.db.pool())
        .await?;

        debug!(found = book.is_some(), "duplicate lookup");
        Ok(book)
    }

    #[instrument(skip(self, book), fields(filename = %book.filename))]
    async fn insert(&self, book: &NewBook) -> Result<Book, LibraryError> {
        let row = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, title_folded, author, filename, cover_url, file_size, language, year, added_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&book.title)
        .bind(fold_title(&book.title))
        .bind(&book.author)
        .bind(&book.filename)
        .bind(&book.cover_url)
        .bind(book.file_size)
        .bind(&book.language)
        .bind(book.year)
        .bind(&book.added_by)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row)
    }
}

/// Trimmed, Unicode-lowercased form of a title, as stored in `title_folded`.
#[must_use]
pub fn fold_title(raw: &str) -> String {
    raw.trim().to_lowercase()
}
