// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-chain health verification with endpoint failover.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::chain::{normalize_rpc_addr, ChainEndpoint};
use crate::error::{RelayerError, RelayerResult};
use crate::retry::FailoverRetry;
use crate::types::FaucetRequest;

/// Faucet endpoints live on the same host as the RPC node, fixed port.
pub const FAUCET_PORT: u16 = 8000;

/// Post-check summary of one chain, one boolean per column of the
/// status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStatusReport {
    pub key: bool,
    pub balance: bool,
    pub light_client: bool,
    pub path: bool,
}

pub struct HealthChecker {
    retry: Arc<FailoverRetry>,
    http: reqwest::Client,
    path_chain_ids: Vec<String>,
    faucet_port: u16,
}

impl HealthChecker {
    pub fn new(retry: Arc<FailoverRetry>, path_chain_ids: Vec<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            retry,
            http,
            path_chain_ids,
            faucet_port: FAUCET_PORT,
        }
    }

    #[cfg(test)]
    pub fn with_faucet_port(mut self, port: u16) -> Self {
        self.faucet_port = port;
        self
    }

    /// Verify the chain's light client and account state are reachable and
    /// current, retrying forever with the shared failover discipline. Only
    /// a configuration fault can surface as an error here.
    pub async fn check(&self, endpoint: &ChainEndpoint) -> RelayerResult<()> {
        debug!(
            chain_id = endpoint.chain_id(),
            rpc_addr = %endpoint.rpc_addr(),
            "checking chain"
        );
        self.retry
            .run(endpoint, "health-check", || self.check_once(endpoint))
            .await?;
        self.log_chain_status(endpoint).await;
        Ok(())
    }

    async fn check_once(&self, endpoint: &ChainEndpoint) -> RelayerResult<()> {
        if !endpoint.is_hub(self.retry.hub_chain_id()) {
            self.request_faucet_funds(endpoint).await?;
        }
        // Trust-on-first-use: the currently connected node is taken as the
        // trust root without validation against a prior one
        endpoint
            .connector()
            .update_light_client_trust(true)
            .await
            .map_err(|err| RelayerError::LightClient(err.to_string()))
    }

    /// Ask the testnet faucet on the chain's RPC host for funds for the
    /// configured key. The response body is logged, never parsed.
    async fn request_faucet_funds(&self, endpoint: &ChainEndpoint) -> RelayerResult<()> {
        let url = faucet_url(&endpoint.rpc_addr(), self.faucet_port)?;
        let address = endpoint.connector().signer_address().await?;
        let request = FaucetRequest {
            address,
            chain_id: endpoint.chain_id().to_string(),
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayerError::Faucet(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayerError::Faucet(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| RelayerError::Faucet(e.to_string()))?;
        info!(chain_id = endpoint.chain_id(), %url, body, "faucet response");
        Ok(())
    }

    /// Post-check summary of the chain's account, light-client and path
    /// state, best effort only.
    async fn chain_status(&self, endpoint: &ChainEndpoint) -> ChainStatusReport {
        let connector = endpoint.connector();
        let key = connector.signer_address().await.is_ok();
        let balance = matches!(
            connector.query_balance(endpoint.key()).await,
            Ok(coins) if !coins.is_empty()
        );
        let light_client = connector.query_light_client_header().await.is_ok();
        let path = self
            .path_chain_ids
            .iter()
            .any(|id| id == endpoint.chain_id());
        ChainStatusReport {
            key,
            balance,
            light_client,
            path,
        }
    }

    async fn log_chain_status(&self, endpoint: &ChainEndpoint) {
        let status = self.chain_status(endpoint).await;
        info!(
            "{:<20} -> key({}) bal({}) path({}) lite({})",
            endpoint.chain_id(),
            ok_mark(status.key),
            ok_mark(status.balance),
            ok_mark(status.path),
            ok_mark(status.light_client)
        );
    }
}

fn ok_mark(ok: bool) -> &'static str {
    if ok {
        "✔"
    } else {
        "✘"
    }
}

/// Same host as the RPC endpoint, fixed alternate port.
fn faucet_url(rpc_addr: &str, port: u16) -> RelayerResult<String> {
    let normalized = normalize_rpc_addr(rpc_addr);
    let url = Url::parse(&normalized)
        .map_err(|e| RelayerError::Faucet(format!("bad rpc address {rpc_addr:?}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| RelayerError::Faucet(format!("rpc address {rpc_addr:?} has no host")))?;
    Ok(format!("{}://{}:{}", url.scheme(), host, port))
}
