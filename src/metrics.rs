// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Histogram, IntCounter, IntCounterVec, Registry,
    Encoder, TextEncoder,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::error;

pub const METRICS_ROUTE: &str = "/metrics";

/// Operational counters for the reconciliation loops. The per-client
/// staleness gauge lives in its own collector, see `status_collector`.
#[derive(Clone, Debug)]
pub struct RelayerMetrics {
    pub(crate) operation_retries: IntCounterVec,
    pub(crate) endpoint_rotations: IntCounterVec,
    pub(crate) checks_completed: IntCounterVec,
    pub(crate) client_updates_completed: IntCounterVec,
    pub(crate) cycles_completed: IntCounter,
    pub(crate) cycle_latency: Histogram,
}

impl RelayerMetrics {
    pub fn new(registry: &Registry) -> Self {
        Self {
            operation_retries: register_int_counter_vec_with_registry!(
                "relayer_operation_retries",
                "Retries of a checker or updater operation, by chain and operation",
                &["chain_id", "operation"],
                registry,
            )
            .unwrap(),
            endpoint_rotations: register_int_counter_vec_with_registry!(
                "relayer_endpoint_rotations",
                "Hub RPC endpoint rotations triggered by failed attempts",
                &["chain_id"],
                registry,
            )
            .unwrap(),
            checks_completed: register_int_counter_vec_with_registry!(
                "relayer_checks_completed",
                "Health checks that eventually succeeded",
                &["chain_id"],
                registry,
            )
            .unwrap(),
            client_updates_completed: register_int_counter_vec_with_registry!(
                "relayer_client_updates_completed",
                "Client updates that eventually succeeded",
                &["chain_id"],
                registry,
            )
            .unwrap(),
            cycles_completed: register_int_counter_with_registry!(
                "relayer_cycles_completed",
                "Full reconciliation cycles completed",
                registry,
            )
            .unwrap(),
            cycle_latency: register_histogram_with_registry!(
                "relayer_cycle_latency_seconds",
                "Wall-clock duration of a full reconciliation cycle",
                registry,
            )
            .unwrap(),
        }
    }

    pub fn new_for_testing() -> Self {
        let registry = Registry::new();
        Self::new(&registry)
    }
}

/// Serve the pull-based metrics endpoint on an already-bound listener.
/// Binding happens at the call site so a bind failure stays fatal.
pub fn start_metrics_server(listener: TcpListener, registry: Registry) -> JoinHandle<()> {
    tokio::spawn(async move {
        let router = Router::new()
            .route(METRICS_ROUTE, get(metrics_handler))
            .with_state(registry);
        if let Err(err) = axum::serve(listener, router.into_make_service()).await {
            error!(%err, "metrics server terminated");
        }
    })
}

async fn metrics_handler(State(registry): State<Registry>) -> (StatusCode, String) {
    let mut buffer = Vec::new();
    match TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            String::from_utf8(buffer).unwrap_or_default(),
        ),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
