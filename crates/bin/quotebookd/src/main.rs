//! # quotebookd: quotebook daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use quotebook_adapter_http_axum::state::AppState;
use quotebook_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteAuthorRepository, SqliteQuoteRepository, SqliteTagRepository,
};
use quotebook_app::services::author_service::AuthorService;
use quotebook_app::services::delete_quote_service::DeleteQuoteService;
use quotebook_app::services::quote_service::QuoteService;
use quotebook_app::services::tag_service::TagService;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.logging.filter))
        .with(fmt::layer())
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let quote_repo = SqliteQuoteRepository::new(pool.clone());
    let author_repo = SqliteAuthorRepository::new(pool.clone());
    let tag_repo = SqliteTagRepository::new(pool);

    // Services
    let quote_service = QuoteService::new(quote_repo.clone());
    let delete_quote_service = DeleteQuoteService::new(quote_repo);
    let author_service = AuthorService::new(author_repo);
    let tag_service = TagService::new(tag_repo);

    // HTTP
    let state = AppState::new(
        quote_service,
        delete_quote_service,
        author_service,
        tag_service,
    );
    let app = quotebook_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, "quotebookd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("quotebookd stopped");
    Ok(())
}

/// Resolve on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
