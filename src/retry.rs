// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared retry/failover discipline for the checker and updater.

use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backoff::BackoffConfig;
use crate::chain::ChainEndpoint;
use crate::endpoint_pool::EndpointPool;
use crate::error::RelayerResult;
use crate::metrics::RelayerMetrics;

/// Unbounded retry with fixed (or configured) backoff. When the failing
/// chain is the hub chain, every retry first rotates to the next pool
/// address and re-validates the endpoint; a re-validation failure is a
/// configuration fault and propagates immediately. Non-hub chains retry
/// at their original address forever.
pub struct FailoverRetry {
    pool: Arc<EndpointPool>,
    hub_chain_id: String,
    backoff: BackoffConfig,
    metrics: Arc<RelayerMetrics>,
}

impl FailoverRetry {
    pub fn new(
        pool: Arc<EndpointPool>,
        hub_chain_id: impl Into<String>,
        backoff: BackoffConfig,
        metrics: Arc<RelayerMetrics>,
    ) -> Self {
        Self {
            pool,
            hub_chain_id: hub_chain_id.into(),
            backoff,
            metrics,
        }
    }

    pub fn hub_chain_id(&self) -> &str {
        &self.hub_chain_id
    }

    /// Drive `op` to success. Only configuration faults from endpoint
    /// re-validation can make this return an error.
    pub async fn run<T, F, Fut>(
        &self,
        endpoint: &ChainEndpoint,
        operation: &str,
        op: F,
    ) -> RelayerResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RelayerResult<T>>,
    {
        // Failover counter is local to this operation, starting at zero
        let mut attempt: usize = 0;
        let mut backoff = self.backoff.build();
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        chain_id = endpoint.chain_id(),
                        rpc_addr = %endpoint.rpc_addr(),
                        operation,
                        %err,
                        "attempt failed, backing off before retry"
                    );
                    self.metrics
                        .operation_retries
                        .with_label_values(&[endpoint.chain_id(), operation])
                        .inc();
                }
            }

            tokio::time::sleep(backoff.next_delay()).await;

            if endpoint.is_hub(&self.hub_chain_id) {
                let next = self.pool.select(attempt).to_string();
                attempt += 1;
                info!(
                    chain_id = endpoint.chain_id(),
                    rpc_addr = %next,
                    "rotating hub RPC endpoint"
                );
                endpoint.set_rpc_addr(next);
                self.metrics
                    .endpoint_rotations
                    .with_label_values(&[endpoint.chain_id()])
                    .inc();
                endpoint.revalidate().await?;
            }
        }
    }
}
