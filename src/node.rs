// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Wires configuration, connectors and metrics into the running daemon.

use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use crate::backoff::BackoffConfig;
use crate::chain::{ChainConnector, ChainEndpoint};
use crate::client_updater::ClientUpdater;
use crate::config::RelayerBotConfig;
use crate::endpoint_pool::EndpointPool;
use crate::health_checker::HealthChecker;
use crate::metrics::RelayerMetrics;
use crate::retry::FailoverRetry;
use crate::scheduler::ReconcileScheduler;
use crate::status_collector::ClientStatusCollector;

/// Build all components for one relay path and spawn the scheduler loops.
/// Returns the loop handles; they live until process shutdown.
pub async fn run_relayer_bot(
    config: RelayerBotConfig,
    path_name: &str,
    tick: Duration,
    home_path: &Path,
    connectors: HashMap<String, Arc<dyn ChainConnector>>,
    registry: &prometheus::Registry,
) -> anyhow::Result<Vec<JoinHandle<()>>> {
    if tick.is_zero() {
        return Err(anyhow!("cycle period must be greater than zero"));
    }
    config.validate()?;
    let path = config.path(path_name)?.clone();

    let pool = Arc::new(EndpointPool::new(config.global.hub_endpoints.clone())?);
    let collector = Arc::new(ClientStatusCollector::new());
    registry
        .register(Box::new(collector.as_ref().clone()))
        .map_err(|e| anyhow!("registering status collector: {e}"))?;
    let metrics = Arc::new(RelayerMetrics::new(registry));

    let mut endpoints = Vec::with_capacity(2);
    for end in [&path.src, &path.dst] {
        let chain = config
            .chain(&end.chain_id)
            .ok_or_else(|| anyhow!("chain {:?} not configured", end.chain_id))?;
        let connector = connectors
            .get(&end.chain_id)
            .cloned()
            .ok_or_else(|| anyhow!("no connector for chain {:?}", end.chain_id))?;
        endpoints.push(Arc::new(ChainEndpoint::new(
            chain,
            &config.global.timeout,
            home_path,
            connector,
        )));
    }
    let dst = endpoints.pop().context("missing dst endpoint")?;
    let src = endpoints.pop().context("missing src endpoint")?;

    let backoff: BackoffConfig = config.global.backoff.clone();
    let retry = Arc::new(FailoverRetry::new(
        pool,
        config.global.hub_chain_id.clone(),
        backoff,
        metrics.clone(),
    ));
    let checker = HealthChecker::new(
        retry.clone(),
        vec![path.src.chain_id.clone(), path.dst.chain_id.clone()],
    );
    let updater = ClientUpdater::new(retry);

    info!(
        path = path_name,
        src = src.chain_id(),
        dst = dst.chain_id(),
        hub = %config.global.hub_chain_id,
        tick_secs = tick.as_secs(),
        "relayer bot starting"
    );

    let scheduler = Arc::new(ReconcileScheduler::new(
        path_name, path, src, dst, checker, updater, collector, metrics, tick,
    ));
    Ok(scheduler.spawn())
}
