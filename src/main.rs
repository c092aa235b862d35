//! PDF Thumbnailer
//!
//! Receives object-created notifications for uploaded PDFs, renders the
//! first page into a PNG thumbnail, publishes it next to the source and
//! records a metadata row for each processed document.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_thumbnailer::config::Config;
use pdf_thumbnailer::db::{self, SqliteMetadataStore};
use pdf_thumbnailer::render::MupdfRenderer;
use pdf_thumbnailer::routes;
use pdf_thumbnailer::state::AppState;
use pdf_thumbnailer::storage::S3Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pdf_thumbnailer=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting PDF Thumbnailer v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Thumbnails: prefix '{}', size {}, target bucket {}",
        config.pipeline.thumbnail_prefix,
        config.pipeline.thumbnail_size,
        config.pipeline.target_bucket.as_deref().unwrap_or("<source bucket>")
    );
    if let Some(endpoint) = &config.storage.endpoint {
        tracing::info!("S3 endpoint: {}", endpoint);
    }

    tokio::fs::create_dir_all(&config.pipeline.work_dir)
        .await
        .with_context(|| format!("Failed to create work dir {}", config.pipeline.work_dir.display()))?;

    // Initialize S3 client
    let s3_client = S3Client::new(&config.storage).await;

    // Initialize database
    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    // Create application state
    let app_state = AppState::new(
        &config,
        Arc::new(s3_client),
        Arc::new(SqliteMetadataStore::new(db_pool)),
        Arc::new(MupdfRenderer::new()),
    );

    let app = routes::app(app_state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("PDF Thumbnailer listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
