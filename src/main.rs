//! Server entry point for the shelfkeeper EPUB backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shelfkeeper_core::api::{AppState, HttpServer};
use shelfkeeper_core::approval::{ApprovalService, SqliteUserStore};
use shelfkeeper_core::fetch::PageFetcher;
use shelfkeeper_core::library::{FsObjectStore, Ingestor, SqliteCatalog};
use shelfkeeper_core::notify::ResendMailer;
use shelfkeeper_core::scrape::SearchClient;
use shelfkeeper_core::Database;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.into_config().context("invalid configuration")?;
    debug!(bind_addr = %config.bind_addr, database = %config.database_path.display(), "configuration loaded");
    if config.frontend_url.is_none() {
        warn!("FRONTEND_URL not set; CORS allows any origin");
    }

    let db = Database::new(&config.database_path)
        .await
        .context("failed to open database")?;
    let store = FsObjectStore::open(&config.storage_dir, config.public_storage_url.as_str())
        .await
        .context("failed to open book storage")?;
    let fetcher = PageFetcher::new().context("failed to build HTTP client")?;
    let mailer = ResendMailer::new(config.resend_api_key.clone(), &config.resend_base_url)
        .context("failed to build mail client")?;

    let state = AppState {
        search: Arc::new(SearchClient::new(
            fetcher.clone(),
            config.search_base_url.clone(),
        )),
        ingestor: Arc::new(Ingestor::new(
            fetcher,
            Arc::new(SqliteCatalog::new(db.clone())),
            Arc::new(store),
        )),
        approval: Arc::new(ApprovalService::new(
            Arc::new(SqliteUserStore::new(db.clone())),
            Arc::new(mailer),
            config.approval_settings(),
        )),
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(public_base_url = %config.public_base_url, "shelfkeeper starting");

    HttpServer::new(state, &config.http_options())
        .serve(listener, shutdown_signal())
        .await
        .context("HTTP server error")?;

    db.close().await;
    info!("shelfkeeper stopped");
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server keeps
/// running until killed instead of stopping at once.
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(error = %error, "failed to listen for Ctrl-C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
}
