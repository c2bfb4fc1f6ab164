//! HTTP API route definitions.

use axum::Router;
use axum::routing::{get, post};

use super::handlers::{self, AppState};

/// Creates the router with every API route.
///
/// Anything unmatched, including a known path with the wrong method, gets the
/// JSON 404.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root).fallback(handlers::not_found))
        .route("/api/health", get(handlers::health).fallback(handlers::not_found))
        .route("/api/search", post(handlers::search).fallback(handlers::not_found))
        .route("/api/add-book", post(handlers::add_book).fallback(handlers::not_found))
        .route(
            "/api/add-book-from-url",
            post(handlers::add_book_from_url).fallback(handlers::not_found),
        )
        .route(
            "/api/notify-admin",
            post(handlers::notify_admin).fallback(handlers::not_found),
        )
        .route(
            "/api/approve-user/:token",
            get(handlers::approve_user).fallback(handlers::not_found),
        )
        .route(
            "/api/reject-user/:token",
            get(handlers::reject_user).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .with_state(app_state)
}
