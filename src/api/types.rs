//! HTTP API request and response bodies.
//!
//! Request fields are all optional so a missing field is reported as a 400
//! with a specific message instead of a generic deserialization error.

use serde::{Deserialize, Serialize};

use crate::library::{Book, BookMetadata};
use crate::scrape::SearchResult;

/// Message returned when a book was shelved.
pub const BOOK_ADDED_MESSAGE: &str = "Livre ajouté avec succès";

/// Message returned when the title is already cataloged.
pub const ALREADY_IN_LIBRARY_MESSAGE: &str = "Livre déjà dans la bibliothèque";

/// `POST /api/search` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Free-text search terms.
    pub query: Option<String>,
}

/// `POST /api/add-book` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddBookRequest {
    /// Book-detail page URL from a search result.
    pub book_url: Option<String>,
    /// Caller-supplied description.
    pub metadata: Option<BookMetadata>,
}

/// `POST /api/add-book-from-url` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddBookFromUrlRequest {
    /// Direct link to the EPUB file.
    pub download_url: Option<String>,
    /// Caller-supplied description.
    pub metadata: Option<BookMetadata>,
    /// Requesting user, recorded as `added_by`.
    pub user_id: Option<String>,
}

/// `POST /api/notify-admin` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyAdminRequest {
    /// Account awaiting approval.
    pub user_id: Option<String>,
    /// Display name for the admin email.
    pub username: Option<String>,
    /// Address of the new reader.
    pub email: Option<String>,
}

/// `POST /api/search` success body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Always `true`.
    pub success: bool,
    /// At most 20 results, in page order.
    pub results: Vec<SearchResult>,
    /// Number of entries in `results`.
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookResponse {
    /// Always `true`.
    pub success: bool,
    /// User-facing confirmation.
    pub message: String,
    /// The stored catalog row.
    pub book: Book,
    /// Public URL of the stored file.
    pub file_url: String,
}

/// 409 body for a title already in the library.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateResponse {
    /// Always `false`.
    pub success: bool,
    /// User-facing explanation.
    pub message: String,
    /// The matching catalog row.
    pub existing: Book,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyAdminResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: String,
    /// Mail provider's message id.
    pub email_id: String,
}

/// Error body shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Short failure summary.
    pub error: String,
    /// Underlying cause, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: &'static str,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

/// `GET /` banner.
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Service name.
    pub message: &'static str,
    /// Advertised routes.
    pub endpoints: Endpoints,
}

/// Route listing advertised on `GET /`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub search: &'static str,
    pub add_book: &'static str,
    pub add_book_from_url: &'static str,
    pub notify_admin: &'static str,
    pub approve_user: &'static str,
    pub reject_user: &'static str,
    pub health: &'static str,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search: "POST /api/search",
            add_book: "POST /api/add-book",
            add_book_from_url: "POST /api/add-book-from-url",
            notify_admin: "POST /api/notify-admin",
            approve_user: "GET /api/approve-user/:token",
            reject_user: "GET /api/reject-user/:token",
            health: "GET /api/health",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_book_request_reads_camel_case() {
        let request: AddBookRequest = serde_json::from_str(
            r#"{"bookUrl":"https://site.example/md5/abc","metadata":{"title":"Dune","year":1965}}"#,
        )
        .unwrap();
        assert_eq!(request.book_url.as_deref(), Some("https://site.example/md5/abc"));
        assert_eq!(request.metadata.unwrap().year.as_deref(), Some("1965"));
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let request: AddBookFromUrlRequest = serde_json::from_str("{}").unwrap();
        assert!(request.download_url.is_none() && request.user_id.is_none());
    }

    #[test]
    fn test_error_response_omits_absent_message() {
        let json = serde_json::to_value(ErrorResponse::new("bookUrl is required")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "bookUrl is required"}));
    }
}
