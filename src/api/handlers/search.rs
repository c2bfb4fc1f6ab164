//! Search handler

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::info;

use super::{AppState, required};
use crate::api::ApiError;
use crate::api::types::{SearchRequest, SearchResponse};

/// `POST /api/search`
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;
    let query = required(request.query, "Query parameter is required")?;

    let results = state.search.search(&query).await.map_err(ApiError::Search)?;
    info!(query = %query, count = results.len(), "search served");

    Ok(Json(SearchResponse {
        success: true,
        count: results.len(),
        results,
    }))
}
