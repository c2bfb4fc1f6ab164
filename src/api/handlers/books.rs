//! Book ingestion handlers: add from a detail page, add from a direct URL.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::info;
use url::Url;

use super::{AppState, required};
use crate::api::ApiError;
use crate::api::types::{
    ALREADY_IN_LIBRARY_MESSAGE, AddBookFromUrlRequest, AddBookRequest, AddBookResponse,
    BOOK_ADDED_MESSAGE, DuplicateResponse,
};
use crate::library::{IngestOutcome, ShelvedBook, UNTITLED};

/// `POST /api/add-book`
pub async fn add_book(
    State(state): State<AppState>,
    payload: Result<Json<AddBookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let book_url = required(request.book_url, "bookUrl is required")?;
    ensure_http_url(&book_url, "bookUrl")?;
    let metadata = request.metadata.unwrap_or_default();

    info!(title = metadata.title().unwrap_or(UNTITLED), "adding book from detail page");
    let outcome = state
        .ingestor
        .ingest_from_detail_page(&book_url, &metadata)
        .await
        .map_err(|e| ApiError::ingest("Failed to add book", e))?;
    Ok(ingest_response(outcome))
}

/// `POST /api/add-book-from-url`
pub async fn add_book_from_url(
    State(state): State<AppState>,
    payload: Result<Json<AddBookFromUrlRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let download_url = required(request.download_url, "downloadUrl is required")?;
    let user_id = required(request.user_id, "userId is required")?;
    ensure_http_url(&download_url, "downloadUrl")?;
    let metadata = request.metadata.unwrap_or_default();

    info!(
        title = metadata.title().unwrap_or(UNTITLED),
        user_id = %user_id,
        "adding book from direct URL"
    );
    let outcome = state
        .ingestor
        .ingest_from_direct_url(&download_url, &metadata, &user_id)
        .await
        .map_err(|e| ApiError::ingest("Failed to add book from URL", e))?;
    Ok(ingest_response(outcome))
}

fn ensure_http_url(value: &str, field: &str) -> Result<(), ApiError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ApiError::bad_request(format!(
            "{field} must be an absolute http(s) URL"
        ))),
    }
}

fn ingest_response(outcome: IngestOutcome) -> Response {
    match outcome {
        IngestOutcome::Added(ShelvedBook { book, file_url }) => Json(AddBookResponse {
            success: true,
            message: BOOK_ADDED_MESSAGE.to_string(),
            book,
            file_url,
        })
        .into_response(),
        IngestOutcome::AlreadyInLibrary(existing) => (
            StatusCode::CONFLICT,
            Json(DuplicateResponse {
                success: false,
                message: ALREADY_IN_LIBRARY_MESSAGE.to_string(),
                existing,
            }),
        )
            .into_response(),
    }
}
