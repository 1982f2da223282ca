use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod listing;
mod routes;
mod state;
mod upload;

#[cfg(test)]
mod test_support;

use common::{HttpRemoteStorage, StorageConfig};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting media proxy service");

    let config = StorageConfig::load()?;
    if config.api_key().is_err() {
        warn!("MEDIA_API_KEY is not set; upload and listing requests will fail");
    }

    let remote = HttpRemoteStorage::new(&config)?;
    let bind_address = config.bind_address.clone();
    let app_state = AppState::new(config, Arc::new(remote));

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Media proxy listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down media proxy service");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
