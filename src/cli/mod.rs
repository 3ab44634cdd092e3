//! CLI module for the credential gateway
//!
//! Provides subcommands:
//! - `serve`: registration, login and JWKS server
//! - `resource`: demo resource server verifying tokens against a JWKS URL

pub mod resource;
pub mod serve;

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use crate::config::AppConfig;

/// Credential Gateway - password registration, login and RS256 token issuance
#[derive(Parser)]
#[command(name = "credential-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the issuing server (register, login, JWKS)
    Serve,

    /// Run the demo resource server that verifies bearer tokens
    Resource(resource::ResourceArgs),
}

fn build_socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((host.parse::<IpAddr>()?, port)))
}

fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    Ok(AppConfig::load()?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["credential-gateway", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["credential-gateway", "resource", "--port", "9000"]).unwrap();
        match cli.command {
            Command::Resource(args) => assert_eq!(args.port, 9000),
            Command::Serve => panic!("expected resource command"),
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = build_socket_addr("0.0.0.0", 8000).unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(build_socket_addr("not-an-ip", 8000).is_err());
    }
}
