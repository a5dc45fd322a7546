use anyhow::{Context, Result};
use std::path::PathBuf;

use schoolfinder::config::{resolve_host, Config};
use schoolfinder::server::SchoolServer;

/// Command-line overrides for the serve command
#[derive(Debug, Default)]
pub struct ServeParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed_file: Option<PathBuf>,
    pub no_demo_data: bool,
    pub latency_ms: Option<u64>,
    pub geocode_seed: Option<u64>,
}

/// Run the HTTP service until Ctrl-C
pub async fn serve(mut config: Config, params: ServeParams) -> Result<()> {
    apply_overrides(&mut config, params)?;
    config.validate()?;

    let server = SchoolServer::new(config.server)
        .inspect_err(|e| {
            tracing::error!(category = e.category().as_str(), error = %e, "Failed to create school server")
        })
        .context("Failed to create school server")?;

    println!("{}", server.info().display());
    println!();

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(category = e.category().as_str(), error = %e, "School server failed")
        })
        .context("School server failed")?;

    Ok(())
}

fn apply_overrides(config: &mut Config, params: ServeParams) -> Result<()> {
    let server = &mut config.server;

    if let Some(host) = params.host {
        server.bind_address = resolve_host(&host, server.bind_address.port())?;
    }
    if let Some(port) = params.port {
        server.bind_address.set_port(port);
    }
    if params.seed_file.is_some() {
        server.seed_file = params.seed_file;
    }
    if params.no_demo_data {
        server.demo_data = false;
    }
    if let Some(ms) = params.latency_ms {
        server.simulated_latency_ms = ms;
    }
    if params.geocode_seed.is_some() {
        server.geocode_seed = params.geocode_seed;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
