//! CRM HTTP server
//!
//! Configuration is read from the YAML file named by `CRM_CONFIG`
//! (default `crm.yaml`); the built-in defaults apply when it is missing.
//! Log levels follow `RUST_LOG` (default `info`).

use anyhow::Result;
use crm::config::CrmConfig;
use crm::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "crm.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("CRM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = CrmConfig::load_or_default(&config_path)?;

    tracing::info!(
        config = %config_path,
        address = %config.server.address(),
        cors = config.server.cors,
        "Starting CRM server"
    );

    ServerBuilder::from_config(config)
        .await?
        .serve_configured()
        .await
}
