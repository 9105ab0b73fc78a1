use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderName;
use clap::Parser;

use jotter::app::{router, AppState};
use jotter::auth::provider::{DemoCookieProvider, IdentityProvider, TrustedHeaderProvider};
use jotter::config::{AppConfig, AuthMode, StoreBackend};
use jotter::db::memory::InMemoryDocumentRepository;
use jotter::db::repository::{DocumentRepository, MongoDocumentRepository};

#[derive(Debug, Parser)]
#[command(name = "jotter", about = "Hierarchical document service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.addr`
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jotter=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());

    tracing::info!("Starting Jotter server...");

    let document_repo: Arc<dyn DocumentRepository> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, documents are lost on shutdown");
            Arc::new(InMemoryDocumentRepository::new())
        }
        StoreBackend::Mongo => {
            let client = mongodb::Client::with_uri_str(&config.store.mongodb_uri)
                .await
                .context("Failed to connect to MongoDB")?;
            let repo = MongoDocumentRepository::new(&client.database(&config.store.database));
            repo.ensure_indexes().await?;
            tracing::info!("Connected to MongoDB at {}", config.store.mongodb_uri);
            Arc::new(repo)
        }
    };

    let identity_provider: Arc<dyn IdentityProvider> = match config.auth.mode {
        AuthMode::Demo => {
            tracing::warn!("Demo authentication enabled, do not use in production");
            Arc::new(DemoCookieProvider)
        }
        AuthMode::Header => {
            let header = HeaderName::try_from(config.auth.subject_header.as_str())
                .with_context(|| {
                    format!("Invalid subject header name: {}", config.auth.subject_header)
                })?;
            tracing::info!("Trusting caller subject from header {}", header);
            Arc::new(TrustedHeaderProvider::new(header))
        }
    };

    tracing::info!(
        "Remove policy: {:?}, parent validation: {}",
        config.lifecycle.remove_policy,
        config.lifecycle.validate_parent
    );

    let state = AppState {
        document_repo,
        identity_provider,
        lifecycle: config.lifecycle,
        demo_mode: config.auth.mode == AuthMode::Demo,
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
