use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, info};

use review_server::config::{AppConfig, StoreBackend};
use review_server::customers::SeaOrmCustomerDirectory;
use review_server::database::init_db;
use review_server::state::AppState;
use review_server::store::{MemoryReviewCollection, MongoReviewCollection, ReviewCollection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Connecting to customer database...");
    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to customer database")?;

    let reviews: Arc<dyn ReviewCollection> = match config.store.backend {
        StoreBackend::Mongo => Arc::new(
            MongoReviewCollection::connect(&config.mongo)
                .await
                .context("Failed to set up MongoDB client")?,
        ),
        StoreBackend::Memory => {
            info!("Using in-memory review collection; reviews are lost on exit");
            Arc::new(MemoryReviewCollection::new())
        }
    };

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        reviews,
        customers: Arc::new(SeaOrmCustomerDirectory::new(db)),
        config,
    };

    let app = review_server::build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;
    info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
