// Service Broker Binary
//
// Entry point for the service broker API server.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use broker_api::{telemetry::init_tracing, BrokerConfig, BrokerServer};
use provisioner_interface::Provisioner;
use user_provided_provisioner::UserProvidedProvisioner;

#[tokio::main]
async fn main() -> Result<()> {
    let config = BrokerConfig::parse();

    // Initialize tracing/logging
    init_tracing(config.log_format);

    tracing::info!("Starting service broker");

    let provisioner: Arc<dyn Provisioner> = Arc::new(UserProvidedProvisioner::new());

    BrokerServer::new(config, provisioner)
        .run()
        .await
        .context("service broker terminated")?;

    Ok(())
}
