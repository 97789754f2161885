// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use clap::Parser;
use relayer_bot::chain::ChainConnector;
use relayer_bot::config::{Config, RelayerBotConfig};
use relayer_bot::json_rpc_chain::JsonRpcChainConnector;
use relayer_bot::metrics::start_metrics_server;
use relayer_bot::node::run_relayer_bot;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(rename_all = "kebab-case")]
#[clap(name = env!("CARGO_BIN_NAME"))]
#[clap(version)]
struct Args {
    /// Name of the relay path to reconcile
    path: String,
    /// Full reconciliation cycle period, in seconds
    #[clap(value_parser = clap::value_parser!(u64).range(1..))]
    tick_secs: u64,
    /// Listen address for the metrics endpoint, e.g. 0.0.0.0:9184
    metrics_listen: SocketAddr,
    #[clap(long, default_value = "config.yaml")]
    config_path: PathBuf,
    /// Home directory handed to connectors on re-initialization
    #[clap(long, default_value = ".relayer-bot")]
    home: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayerBotConfig::load(&args.config_path)
        .with_context(|| format!("loading config from {}", args.config_path.display()))?;

    // A bind failure here is fatal; the daemon must not run unobserved
    let registry = prometheus::Registry::new();
    let listener = tokio::net::TcpListener::bind(args.metrics_listen)
        .await
        .with_context(|| format!("binding metrics listener on {}", args.metrics_listen))?;
    let _metrics_server = start_metrics_server(listener, registry.clone());
    info!("metrics server listening on {}", args.metrics_listen);

    let mut connectors: HashMap<String, Arc<dyn ChainConnector>> = HashMap::new();
    for chain in &config.chains {
        let timeout = config
            .chain_timeout(chain)
            .with_context(|| format!("timeout for chain {}", chain.chain_id))?;
        connectors.insert(
            chain.chain_id.clone(),
            Arc::new(JsonRpcChainConnector::new(
                &chain.rpc_addr,
                &chain.key,
                timeout,
            )),
        );
    }

    let _handles = run_relayer_bot(
        config,
        &args.path,
        Duration::from_secs(args.tick_secs),
        &args.home,
        connectors,
        &registry,
    )
    .await?;

    // Shutdown is immediate at signal receipt; in-flight backoff sleeps
    // are abandoned with the rest of the loops
    wait_for_shutdown().await?;
    info!("shutdown signal received, bye");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
