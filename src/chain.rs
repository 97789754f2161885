// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Chain collaborator contract and the per-chain endpoint state.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::ChainConfig;
use crate::error::{RelayerError, RelayerResult};
use crate::types::{ChannelOrdering, ClientState, Coins, Header, RelayMsg, TxResult};

/// The opaque Chain collaborator.
///
/// Everything that needs chain-specific machinery (light-client
/// verification, message construction, signing, key storage) lives behind
/// this trait; the reconciliation core only drives it.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    /// Latest verified header from this chain's light client.
    async fn query_light_client_header(&self) -> RelayerResult<Header>;

    /// On-chain light-client state for the currently bound client path.
    async fn query_client_state(&self) -> RelayerResult<ClientState>;

    /// Re-establish the local light-client trust root. With `force` the
    /// currently connected node is trusted as-is (trust-on-first-use).
    async fn update_light_client_trust(&self, force: bool) -> RelayerResult<()>;

    /// Register or refresh the client path binding used by subsequent
    /// queries and update submissions.
    async fn register_client_path(
        &self,
        client_id: &str,
        connection_id: &str,
        channel_id: &str,
        port_id: &str,
        ordering: ChannelOrdering,
    ) -> RelayerResult<()>;

    /// Sign and broadcast `msgs`, returning the inclusion report.
    async fn submit_messages(&self, msgs: Vec<RelayMsg>) -> RelayerResult<TxResult>;

    /// Spendable balance of the named key.
    async fn query_balance(&self, key: &str) -> RelayerResult<Coins>;

    /// Address of the configured signing key.
    async fn signer_address(&self) -> RelayerResult<String>;

    /// Rebuild connection state after an RPC address change. The new
    /// address is passed explicitly; a failure here is a configuration
    /// fault, not a transient one.
    async fn reinitialize(
        &self,
        home_path: &Path,
        rpc_addr: &str,
        timeout: Duration,
    ) -> RelayerResult<()>;
}

/// One blockchain the daemon talks to.
///
/// The RPC address is the only field that changes after startup; both
/// scheduler loops may touch the same chain concurrently, so it sits
/// behind its own lock and swaps are whole-value replacements.
pub struct ChainEndpoint {
    chain_id: String,
    key: String,
    timeout: String,
    home_path: PathBuf,
    rpc_addr: RwLock<String>,
    connector: Arc<dyn ChainConnector>,
}

impl ChainEndpoint {
    pub fn new(
        config: &ChainConfig,
        default_timeout: &str,
        home_path: &Path,
        connector: Arc<dyn ChainConnector>,
    ) -> Self {
        Self {
            chain_id: config.chain_id.clone(),
            key: config.key.clone(),
            timeout: config
                .timeout
                .clone()
                .unwrap_or_else(|| default_timeout.to_string()),
            home_path: home_path.to_path_buf(),
            rpc_addr: RwLock::new(config.rpc_addr.clone()),
            connector,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn connector(&self) -> &Arc<dyn ChainConnector> {
        &self.connector
    }

    pub fn is_hub(&self, hub_chain_id: &str) -> bool {
        self.chain_id == hub_chain_id
    }

    /// Current RPC address. Prior addresses are not retained.
    pub fn rpc_addr(&self) -> String {
        self.rpc_addr
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_rpc_addr(&self, addr: impl Into<String>) {
        let mut guard = self.rpc_addr.write().unwrap_or_else(|e| e.into_inner());
        *guard = addr.into();
    }

    /// Re-validate connection parameters after an RPC address swap:
    /// parse the configured timeout and re-initialize the connector
    /// against the current address. Both failure modes are configuration
    /// faults and propagate immediately.
    pub async fn revalidate(&self) -> RelayerResult<()> {
        let timeout =
            humantime::parse_duration(&self.timeout).map_err(|e| RelayerError::InvalidTimeout {
                value: self.timeout.clone(),
                reason: e.to_string(),
            })?;
        let addr = self.rpc_addr();
        self.connector
            .reinitialize(&self.home_path, &addr, timeout)
            .await
            .map_err(|err| RelayerError::Reinitialize {
                chain_id: self.chain_id.clone(),
                reason: err.to_string(),
            })
    }
}

impl std::fmt::Debug for ChainEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEndpoint")
            .field("chain_id", &self.chain_id)
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .field("rpc_addr", &self.rpc_addr())
            .finish()
    }
}

/// RPC addresses in static pools are allowed to omit the scheme.
pub fn normalize_rpc_addr(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}
