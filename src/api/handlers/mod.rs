//! HTTP API request handlers.

mod approval;
mod books;
mod search;
mod system;

use std::sync::Arc;

use crate::approval::ApprovalService;
use crate::library::Ingestor;
use crate::scrape::SearchClient;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub search: Arc<SearchClient>,
    pub ingestor: Arc<Ingestor>,
    pub approval: Arc<ApprovalService>,
}

pub use approval::{approve_user, notify_admin, reject_user};
pub use books::{add_book, add_book_from_url};
pub use search::search;
pub use system::{health, not_found, root};

/// Returns the trimmed value, or a 400 with `message` when missing or blank.
fn required(value: Option<String>, message: &str) -> Result<String, super::ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| super::ApiError::bad_request(message))
}
