//! Queue Display Server - Binary Entry Point
//!
//! Serves the display snapshot API and the real-time notification channel.

use std::sync::Arc;

use queue_display::api::http::create_router;
use queue_display::api::websocket::AppState;
use queue_display::config::ServerConfig;
use queue_display::logging::init_logging;
use queue_display::QueueStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_logging();
    let config = ServerConfig::from_env()?;

    let store = match &config.polyclinics_file {
        Some(path) => {
            let store = QueueStore::from_file(path)?;
            tracing::info!(
                path = %path.display(),
                polyclinics = store.polyclinics().len(),
                "Loaded polyclinics"
            );
            store
        }
        None => {
            tracing::warn!("QUEUE_POLYCLINICS_FILE not set, starting with no polyclinics");
            QueueStore::new()
        }
    };

    let state = Arc::new(AppState::new(Arc::new(store), config.subscriber_buffer));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, version = queue_display::VERSION, "Queue server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Queue server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
