// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC realization of the Chain collaborator.
//!
//! All chain-specific heavy lifting (light-client verification, message
//! construction, signing) runs in an external relayer sidecar; this
//! client only transports the operations over HTTP JSON-RPC 2.0.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

use crate::chain::{normalize_rpc_addr, ChainConnector};
use crate::error::{RelayerError, RelayerResult};
use crate::types::{ChannelOrdering, ClientState, Coins, Header, RelayMsg, TxResult};

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug)]
pub struct JsonRpcChainConnector {
    http: reqwest::Client,
    rpc_url: RwLock<String>,
    timeout: RwLock<Duration>,
    key: String,
    request_id: Arc<AtomicU64>,
}

impl JsonRpcChainConnector {
    /// `timeout` is the chain's configured request timeout; it bounds
    /// every call from the first request on and can later be swapped by
    /// `reinitialize`.
    pub fn new(rpc_addr: &str, key: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .build()
            .unwrap_or_default();
        Self {
            http,
            rpc_url: RwLock::new(normalize_rpc_addr(rpc_addr)),
            timeout: RwLock::new(timeout),
            key: key.to_string(),
            request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn rpc_url(&self) -> String {
        self.rpc_url
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn request_timeout(&self) -> Duration {
        *self.timeout.read().unwrap_or_else(|e| e.into_inner())
    }

    async fn call(&self, method: &str, params: Value) -> RelayerResult<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        let response = self
            .http
            .post(self.rpc_url())
            .timeout(self.request_timeout())
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayerError::Rpc(format!("{method}: {e}")))?;
        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RelayerError::Rpc(format!("{method}: {e}")))?;
        if let Some(err) = body.error {
            return Err(RelayerError::Rpc(format!(
                "{method}: {} (code {})",
                err.message, err.code
            )));
        }
        body.result
            .ok_or_else(|| RelayerError::Rpc(format!("{method}: missing result")))
    }
}

#[async_trait]
impl ChainConnector for JsonRpcChainConnector {
    async fn query_light_client_header(&self) -> RelayerResult<Header> {
        let value = self.call("light_client.header", json!([])).await?;
        Ok(Header {
            chain_id: value
                .get("chain_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            height: value.get("height").and_then(Value::as_u64).unwrap_or(0),
            raw: value,
        })
    }

    async fn query_client_state(&self) -> RelayerResult<ClientState> {
        let value = self.call("client.state", json!([])).await?;
        Ok(ClientState {
            latest_time: value
                .get("time")
                .and_then(Value::as_str)
                .map(str::to_string),
            raw: value.to_string(),
        })
    }

    async fn update_light_client_trust(&self, force: bool) -> RelayerResult<()> {
        self.call("light_client.init", json!([{ "force": force }]))
            .await
            .map_err(|e| RelayerError::LightClient(e.to_string()))?;
        Ok(())
    }

    async fn register_client_path(
        &self,
        client_id: &str,
        connection_id: &str,
        channel_id: &str,
        port_id: &str,
        ordering: ChannelOrdering,
    ) -> RelayerResult<()> {
        self.call(
            "path.register",
            json!([client_id, connection_id, channel_id, port_id, ordering.to_string()]),
        )
        .await?;
        Ok(())
    }

    async fn submit_messages(&self, msgs: Vec<RelayMsg>) -> RelayerResult<TxResult> {
        let value = self.call("tx.submit", json!([msgs])).await?;
        Ok(TxResult {
            height: value.get("height").and_then(Value::as_u64).unwrap_or(0),
            raw: value.to_string(),
        })
    }

    async fn query_balance(&self, key: &str) -> RelayerResult<Coins> {
        let value = self.call("bank.balance", json!([key])).await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    async fn signer_address(&self) -> RelayerResult<String> {
        let value = self.call("keys.address", json!([self.key])).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RelayerError::Rpc("keys.address: non-string result".to_string()))
    }

    /// Adopt the new address and timeout for all subsequent calls. The
    /// address must at least parse as a URL; anything deeper is left to
    /// the next actual RPC call.
    async fn reinitialize(
        &self,
        _home_path: &Path,
        rpc_addr: &str,
        timeout: Duration,
    ) -> RelayerResult<()> {
        let normalized = normalize_rpc_addr(rpc_addr);
        Url::parse(&normalized)
            .map_err(|e| RelayerError::Rpc(format!("bad rpc address {rpc_addr:?}: {e}")))?;
        *self.rpc_url.write().unwrap_or_else(|e| e.into_inner()) = normalized;
        *self.timeout.write().unwrap_or_else(|e| e.into_inner()) = timeout;
        Ok(())
    }
}
