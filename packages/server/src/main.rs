use std::sync::Arc;

use common::storage::{BlobStore, FilesystemBlobStore};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, info, warn};

use server::config::AppConfig;
use server::database;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    info!("Connecting to database...");
    let db = database::init_db(&config.database.url).await?;

    let blob_store = FilesystemBlobStore::new(
        config.storage.uploads_dir.clone(),
        config.storage.max_upload_size,
    )
    .await?;
    if !blob_store.exists(&config.storage.default_image).await? {
        warn!(
            "default image '{}' is missing from {}; tests without an upload will 404 on it",
            config.storage.default_image,
            config.storage.uploads_dir.display()
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        blob_store: Arc::new(blob_store),
        config,
    };

    let app = server::build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
