//! Stockpulse API Server
//!
//! HTTP API serving stock trend analytics, the audit log and chat forwarding.

use dotenvy::dotenv;
use std::sync::Arc;
use stockpulse::config::AppConfig;
use stockpulse::core::http::start_server;
use stockpulse::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config = Arc::new(AppConfig::from_env()?);
    logging::init_logging(config.is_production());

    info!("Starting Stockpulse API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);
    info!(quote_api = %config.quote.base_url, "Quote API");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
