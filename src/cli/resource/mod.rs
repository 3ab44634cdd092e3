//! Resource command - demo server that trusts tokens via JWKS

use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{create_resource_router, with_metrics};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::init_metrics;

use super::{build_socket_addr, load_config, shutdown_signal};

#[derive(Args, Debug, Clone)]
pub struct ResourceArgs {
    /// Port to listen on
    #[arg(long, default_value_t = 8001)]
    pub port: u16,

    /// JWKS URL, overriding `verifier.jwks_url`
    #[arg(long)]
    pub jwks_url: Option<String>,
}

/// Run the resource server
pub async fn run(args: ResourceArgs) -> anyhow::Result<()> {
    let mut config = load_config()?;
    init_logging(&config.logging);

    if let Some(url) = args.jwks_url {
        config.verifier.jwks_url = url;
    }

    let state = crate::create_resource_state(&config)?;

    // The issuer may start later; keys are fetched again on first use
    if let Err(e) = state.verifier.refresh().await {
        warn!(error = %e, url = %config.verifier.jwks_url, "Initial JWKS fetch failed");
    }

    let metrics = init_metrics(&config.metrics);
    let app = with_metrics(create_resource_router(state), metrics, &config.metrics.path);

    let addr = build_socket_addr(&config.server.host, args.port)?;
    info!(%addr, jwks_url = %config.verifier.jwks_url, "Starting resource server");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
