//! HTTP API for the reader app.
//!
//! JSON endpoints for search, ingestion and admin notification, plus the HTML
//! pages behind the emailed approve/reject links. Unknown routes answer with a
//! JSON 404.

mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;
pub use server::{FILES_ROUTE, HttpOptions, HttpServer, build_app};
