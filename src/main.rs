//! Cognee client binary entry point.
//!
//! Loads configuration, restores the persisted API key and reports the
//! liveness of the self-hosted backend, the MCP server and, when a
//! credential is available, the cloud backend. All logs go to stderr.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;

use cognee_client::client::{ApiClient, HttpTransport};
use cognee_client::config::Config;
use cognee_client::credentials::FileStorage;
use cognee_client::error::AppError;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            tracing::error!("{}", AppError::from(e));
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);
    tracing::info!("cognee-client starting...");

    if let Err(e) = run(config).await {
        tracing::error!("Health check failed: {e}");
        std::process::exit(1);
    }

    tracing::info!("cognee-client finished");
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            level
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(config: Config) -> Result<(), AppError> {
    tracing::info!(
        local = %config.local_base_url,
        cloud = %config.cloud_base_url,
        reauth = config.reauthentication_enabled,
        "Configuration loaded"
    );

    let storage = Arc::new(FileStorage::new(&config.credentials_path));
    let client = ApiClient::new(config, Arc::new(HttpTransport::new()));
    if client.attach_storage(storage) {
        tracing::info!("Restored persisted API key");
    }

    let local = client.check_local_health().await?;
    tracing::info!(status = local.status, "Local backend is healthy");

    match client.check_mcp_health().await {
        Ok(response) => tracing::info!(status = response.status, "MCP server is healthy"),
        Err(e) => tracing::warn!(error = %e, "MCP server is not responding"),
    }

    if client.credential().is_some() {
        let cloud = client.check_cloud_health().await?;
        tracing::info!(status = cloud.status, "Cloud backend is healthy");
    } else {
        tracing::info!("No API key configured, skipping cloud health check");
    }

    Ok(())
}
