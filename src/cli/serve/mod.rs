//! Serve command - runs the issuing server

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, with_metrics};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::init_metrics;

use super::{build_socket_addr, load_config, shutdown_signal};

/// Run the issuing server
///
/// Refuses to start when the signing keys cannot be loaded.
pub async fn run() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&config.logging);

    let state = crate::create_app_state(&config).await?;
    let metrics = init_metrics(&config.metrics);
    let app = with_metrics(create_router(state), metrics, &config.metrics.path);

    let addr = build_socket_addr(&config.server.host, config.server.port)?;
    info!(%addr, kid = %config.auth.key_id, "Starting credential gateway");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
