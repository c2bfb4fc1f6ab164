//! HTTP API server: middleware stack and serve loop.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::AppState;
use super::routes::create_router;

/// Route prefix under which stored books are served.
pub const FILES_ROUTE: &str = "/files";

/// Middleware and static-file options.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Allowed browser origin; any origin (without credentials) when unset.
    pub cors_origin: Option<HeaderValue>,
    /// Directory served under [`FILES_ROUTE`], if any.
    pub files_dir: Option<PathBuf>,
}

/// HTTP API server.
#[derive(Debug)]
pub struct HttpServer {
    app: Router,
}

impl HttpServer {
    #[must_use]
    pub fn new(state: AppState, options: &HttpOptions) -> Self {
        Self {
            app: build_app(state, options),
        }
    }

    /// Serves until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the accept loop fails.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("HTTP API listening on http://{addr}");
        }
        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("HTTP server shutting down");
            })
            .await
    }
}

/// Router with CORS, request tracing, and the optional file route applied.
pub fn build_app(state: AppState, options: &HttpOptions) -> Router {
    let mut app = create_router(state);
    if let Some(dir) = &options.files_dir {
        app = app.nest_service(FILES_ROUTE, ServeDir::new(dir));
    }
    app.layer(cors_layer(options.cors_origin.clone()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<HeaderValue>) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}
