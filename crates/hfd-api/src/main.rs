//! # hfd-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for HTML Fast Deploy.
//! Binds to `0.0.0.0:$PORT` (default 8000).

use hfd_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let port = config.port;
    let operators: Vec<String> = config.credentials.usernames().map(String::from).collect();

    let state = AppState::new(config).map_err(|e| {
        tracing::error!("Failed to open apps root: {e}");
        e
    })?;
    tracing::info!(
        apps_dir = %state.store.root().display(),
        ?operators,
        "application store ready"
    );

    let app = hfd_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("HTML Fast Deploy listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
