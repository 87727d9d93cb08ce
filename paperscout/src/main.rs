use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paperscout::api::{create_router, AppState};
use paperscout::archive::{PaperArchive, PaperCatalog, S3Archive};
use paperscout::config::Config;
use paperscout::embeddings::EmbeddingProvider;
use paperscout::llm::LlmProvider;
use paperscout::vector::QdrantIndex;

#[derive(Parser)]
#[command(name = "paperscout")]
#[command(about = "Retrieval-augmented paper recommendation and chat service")]
struct Args {
    /// Load the paper metadata CSV from a local file instead of the archive
    #[arg(long)]
    catalog_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperscout=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "PAPERSCOUT_API_KEYS is not set — protected endpoints are locked. Set PAPERSCOUT_API_KEYS to enable access."
        );
    }

    tracing::info!("Connecting to archive at {}...", config.archive.endpoint);
    let archive: Arc<dyn PaperArchive> = Arc::new(S3Archive::new(&config.archive)?);

    let catalog = match &args.catalog_path {
        Some(path) => {
            tracing::info!("Loading paper catalog from {}...", path.display());
            PaperCatalog::from_csv_path(path)?
        }
        None => {
            tracing::info!("Loading paper catalog from archive key {}...", config.archive.metadata_key);
            PaperCatalog::load(archive.as_ref(), &config.archive).await?
        }
    };
    tracing::info!("Catalog loaded: {} papers", catalog.len());
    let catalog = Arc::new(catalog);

    tracing::info!("Connecting to vector store at {}...", config.vector.url);
    let index = Arc::new(QdrantIndex::new(&config.vector)?);

    tracing::info!("Loading embedding model: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - summaries and chat will be disabled");
    }

    let state = AppState::new(config.clone(), catalog, index, archive, embeddings, llm);

    let cancel_token = CancellationToken::new();

    tracing::info!("Starting session sweeper...");
    let sessions = state.sessions.clone();
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Session sweeper shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(sessions.interval_secs())) => {
                    sessions.run_once();
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Paperscout starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
