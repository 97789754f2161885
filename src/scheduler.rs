// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The two long-lived reconciliation loops.
//!
//! A fast sampling loop records client staleness into the status
//! collector once a minute; a slower full-cycle loop runs health checks
//! and client updates for both directions of the configured path. Both
//! loops block on their timers (no busy polling) and run until process
//! shutdown.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::chain::ChainEndpoint;
use crate::client_updater::ClientUpdater;
use crate::config::{PathConfig, PathEndConfig};
use crate::error::{RelayerError, RelayerResult};
use crate::health_checker::HealthChecker;
use crate::metrics::RelayerMetrics;
use crate::status_collector::{ClientStatusCollector, STATUS_OK};
use crate::types::latest_client_time;

/// Staleness sampling period. Not operator-configurable.
pub const SAMPLING_PERIOD: Duration = Duration::from_secs(60);

pub struct ReconcileScheduler {
    path_name: String,
    path: PathConfig,
    src: Arc<ChainEndpoint>,
    dst: Arc<ChainEndpoint>,
    checker: HealthChecker,
    updater: ClientUpdater,
    collector: Arc<ClientStatusCollector>,
    metrics: Arc<RelayerMetrics>,
    tick: Duration,
}

impl ReconcileScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        path_name: impl Into<String>,
        path: PathConfig,
        src: Arc<ChainEndpoint>,
        dst: Arc<ChainEndpoint>,
        checker: HealthChecker,
        updater: ClientUpdater,
        collector: Arc<ClientStatusCollector>,
        metrics: Arc<RelayerMetrics>,
        tick: Duration,
    ) -> Self {
        Self {
            path_name: path_name.into(),
            path,
            src,
            dst,
            checker,
            updater,
            collector,
            metrics,
            tick,
        }
    }

    /// Spawn both loops. They run for the lifetime of the process; the
    /// returned handles are only used to keep them alive.
    pub fn spawn(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let sampling = {
            let scheduler = self.clone();
            tokio::spawn(async move { scheduler.sampling_loop().await })
        };
        let full_cycle = tokio::spawn(async move { self.full_cycle_loop().await });
        vec![sampling, full_cycle]
    }

    async fn sampling_loop(&self) {
        let mut ticker = interval(SAMPLING_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // First tick completes immediately
            ticker.tick().await;
            self.sample_client(&self.src, &self.path.src).await;
            self.sample_client(&self.dst, &self.path.dst).await;
            debug!(path = %self.path_name, "client state sampling pass done");
        }
    }

    async fn full_cycle_loop(&self) {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One reconciliation pass: health-check both path endpoints, then
    /// update clients in both directions. A configuration fault defers
    /// the rest of the cycle to the next tick; it neither kills the loop
    /// nor the process.
    pub async fn run_cycle(&self) {
        let started = Instant::now();
        for endpoint in [&self.src, &self.dst] {
            if let Err(err) = self.checker.check(endpoint).await {
                error!(
                    chain_id = endpoint.chain_id(),
                    path = %self.path_name,
                    %err,
                    "health check aborted by configuration fault, cycle deferred to next tick"
                );
                return;
            }
            self.metrics
                .checks_completed
                .with_label_values(&[endpoint.chain_id()])
                .inc();
        }

        let directions = [
            (&self.src, &self.dst, &self.path.src),
            (&self.dst, &self.src, &self.path.dst),
        ];
        for (src, dst, end) in directions {
            if let Err(err) = self.updater.update(src, dst, &self.path_name, end).await {
                error!(
                    chain_id = src.chain_id(),
                    path = %self.path_name,
                    client_id = %end.client_id,
                    %err,
                    "client update aborted by configuration fault, cycle deferred to next tick"
                );
                return;
            }
            self.metrics
                .client_updates_completed
                .with_label_values(&[src.chain_id()])
                .inc();
        }

        self.metrics.cycles_completed.inc();
        self.metrics
            .cycle_latency
            .observe(started.elapsed().as_secs_f64());
        info!(
            path = %self.path_name,
            time = %Utc::now().to_rfc3339(),
            "reconciliation cycle complete"
        );
    }

    /// Sample one path end's client state into the status collector.
    /// Failures here are logged and swallowed; the loop must never stop.
    async fn sample_client(&self, endpoint: &ChainEndpoint, end: &PathEndConfig) {
        if let Err(err) = self.try_sample(endpoint, end).await {
            warn!(
                chain_id = endpoint.chain_id(),
                client_id = %end.client_id,
                %err,
                "client state sample skipped"
            );
        }
    }

    async fn try_sample(&self, endpoint: &ChainEndpoint, end: &PathEndConfig) -> RelayerResult<()> {
        endpoint
            .connector()
            .register_client_path(
                &end.client_id,
                &end.connection_id,
                &end.channel_id,
                &end.port_id,
                end.ordering,
            )
            .await?;
        let state = endpoint.connector().query_client_state().await?;
        match latest_client_time(&state) {
            Some(time) => {
                self.collector.record(STATUS_OK, time, &end.client_id);
                Ok(())
            }
            None => Err(RelayerError::Internal(
                "client state carries no timestamp".to_string(),
            )),
        }
    }
}
