//! Approval handlers: admin notification and the emailed decision links.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use tracing::error;

use super::{AppState, required};
use crate::api::ApiError;
use crate::api::pages::{self, DecisionLink};
use crate::api::types::{NotifyAdminRequest, NotifyAdminResponse};
use crate::approval::{ApprovalError, ApprovalOutcome};

const NOTIFY_FIELDS_REQUIRED: &str = "userId, username, and email are required";

/// `POST /api/notify-admin`
pub async fn notify_admin(
    State(state): State<AppState>,
    payload: Result<Json<NotifyAdminRequest>, JsonRejection>,
) -> Result<Json<NotifyAdminResponse>, ApiError> {
    let Json(request) = payload?;
    let user_id = required(request.user_id, NOTIFY_FIELDS_REQUIRED)?;
    let username = required(request.username, NOTIFY_FIELDS_REQUIRED)?;
    let email = required(request.email, NOTIFY_FIELDS_REQUIRED)?;

    let email_id = state
        .approval
        .notify_admin(&user_id, &username, &email)
        .await
        .map_err(ApiError::Notify)?;

    Ok(Json(NotifyAdminResponse {
        success: true,
        message: "Admin notification sent".to_string(),
        email_id,
    }))
}

/// `GET /api/approve-user/:token`
pub async fn approve_user(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    decision_page(DecisionLink::Approve, state.approval.approve(&token).await)
}

/// `GET /api/reject-user/:token`
pub async fn reject_user(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    decision_page(DecisionLink::Reject, state.approval.reject(&token).await)
}

fn decision_page(link: DecisionLink, result: Result<ApprovalOutcome, ApprovalError>) -> Response {
    match result {
        Ok(outcome) => pages::outcome(link, &outcome),
        Err(ApprovalError::InvalidToken) => pages::invalid_link(link),
        Err(other) => {
            error!(error = %other, ?link, "decision link failed");
            pages::failure(link)
        }
    }
}
