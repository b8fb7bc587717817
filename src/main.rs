// EstateBook Marketplace - Main Entry Point

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use estatebook_marketplace::app_state::{AppState, Config, SharedState};
use estatebook_marketplace::routes::api_router;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(
        port = config.port,
        data_dir = %config.data_dir.display(),
        "starting EstateBook marketplace"
    );

    let state: SharedState = Arc::new(Mutex::new(AppState::new(&config)));
    let app = api_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!(%addr, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // snapshot on the way out so negotiations survive a restart
    if let Ok(app_state) = state.lock() {
        if let Err(e) = app_state.save_to_disk() {
            error!(error = %e, "failed to save state");
        }
    }
    info!("shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("shutdown signal received, saving state");
}
