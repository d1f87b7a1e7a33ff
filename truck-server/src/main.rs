//! truck-server: food truck site and admin API

use truck_server::utils::init_logger;
use truck_server::{AppState, Config, create_router};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger(config.log_level.as_deref(), config.log_dir.as_deref());

    tracing::info!(
        "Starting truck-server (env: {}, store: {:?})",
        config.environment,
        config.store_backend
    );

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let state = AppState::new(config).await?;

    // Load the map provider in the background
    let maps = state.maps.clone();
    tokio::spawn(async move {
        let _ = maps.load().await;
    });

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("truck-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("truck-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
