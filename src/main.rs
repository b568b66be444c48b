// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use opkit::config::Config;
use opkit::kit::{ensure_all_with_cancel, Context};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting opkit CRD registration");

    // Load configuration
    let config = Config::from_env()?;
    let descriptors = config.load_descriptors()?;
    info!(
        "Configuration loaded: {} CRDs from {}",
        descriptors.len(),
        config.crd_file.display()
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let ctx = Context::new(client.clone(), client, config.poll_interval, config.timeout)?;

    // Abort outstanding waits on Ctrl-C
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling CRD registration");
            trigger.cancel();
        }
    });

    ensure_all_with_cancel(&ctx, &descriptors, &cancel).await?;

    info!("All CRDs are established");
    Ok(())
}
