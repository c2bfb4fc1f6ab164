//! Mapping of domain failures to HTTP responses for the JSON endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use super::types::ErrorResponse;
use crate::approval::ApprovalError;
use crate::library::IngestError;
use crate::scrape::ScrapeError;

/// Failure of a JSON endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// The upstream search failed.
    #[error("search failed: {0}")]
    Search(#[source] ScrapeError),

    /// Ingestion failed; `context` is the client-facing summary.
    #[error("{context}: {source}")]
    Ingest {
        context: &'static str,
        #[source]
        source: IngestError,
    },

    /// The admin could not be notified.
    #[error("admin notification failed: {0}")]
    Notify(#[source] ApprovalError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    #[must_use]
    pub fn ingest(context: &'static str, source: IngestError) -> Self {
        Self::Ingest { context, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Search(_) | Self::Ingest { .. } | Self::Notify(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::BadRequest(message) => ErrorResponse::new(message.clone()),
            Self::Search(ScrapeError::SearchFailed(message)) => {
                ErrorResponse::new("Search failed").with_message(message.clone())
            }
            Self::Search(other) => ErrorResponse::new("Search failed").with_message(other.to_string()),
            Self::Ingest { context, source } => {
                ErrorResponse::new(*context).with_message(source.to_string())
            }
            Self::Notify(source @ ApprovalError::UnknownUser { .. }) => {
                ErrorResponse::new("Failed to save approval token").with_message(source.to_string())
            }
            Self::Notify(ApprovalError::Mail(source)) => {
                ErrorResponse::new("Failed to send admin email").with_message(source.to_string())
            }
            Self::Notify(other) => {
                ErrorResponse::new("Failed to notify admin").with_message(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
