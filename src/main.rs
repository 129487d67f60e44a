use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use room_relay::adapters::http::app_router;
use room_relay::application::RelayHub;
use room_relay::config::{init_tracing, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server)?;

    let hub = RelayHub::in_memory();
    let app = app_router(
        hub,
        &config.relay.ws_path,
        ServeDir::new(&config.relay.static_dir),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        ws_path = %config.relay.ws_path,
        static_dir = %config.relay.static_dir.display(),
        "Listening on port {}",
        addr.port()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
