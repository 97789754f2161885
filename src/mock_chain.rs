// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A scripted mock Chain collaborator for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::chain::ChainConnector;
use crate::error::RelayerResult;
use crate::types::{ChannelOrdering, ClientState, Coin, Coins, Header, RelayMsg, TxResult};

/// Mock used in test environments. Clones share the same scripted queues
/// and call records, so tests keep a handle while the component under test
/// owns another.
#[derive(Clone)]
pub struct MockChain {
    chain_id: String,
    address: String,
    balance: Arc<Mutex<Coins>>,
    trust_results: Arc<Mutex<VecDeque<RelayerResult<()>>>>,
    submit_results: Arc<Mutex<VecDeque<RelayerResult<TxResult>>>>,
    client_state_result: Arc<Mutex<Option<RelayerResult<ClientState>>>>,
    reinitialize_results: Arc<Mutex<VecDeque<RelayerResult<()>>>>,
    reinitialize_calls: Arc<Mutex<Vec<(String, Duration)>>>,
    registered_paths: Arc<Mutex<Vec<String>>>,
    submitted_messages: Arc<Mutex<Vec<Vec<RelayMsg>>>>,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockChain {
    pub fn new(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            address: format!("cosmos1{chain_id}mockaddr"),
            balance: Arc::new(Mutex::new(Coins(vec![Coin {
                denom: "stake".to_string(),
                amount: 1_000,
            }]))),
            trust_results: Arc::new(Mutex::new(VecDeque::new())),
            submit_results: Arc::new(Mutex::new(VecDeque::new())),
            client_state_result: Arc::new(Mutex::new(None)),
            reinitialize_results: Arc::new(Mutex::new(VecDeque::new())),
            reinitialize_calls: Arc::new(Mutex::new(Vec::new())),
            registered_paths: Arc::new(Mutex::new(Vec::new())),
            submitted_messages: Arc::new(Mutex::new(Vec::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Share one call log between several mocks to assert cross-chain
    /// ordering.
    pub fn with_call_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.call_log = log;
        self
    }

    fn log(&self, op: &str) {
        self.call_log
            .lock()
            .unwrap()
            .push(format!("{op}:{}", self.chain_id));
    }

    pub fn queue_trust_result(&self, result: RelayerResult<()>) {
        self.trust_results.lock().unwrap().push_back(result);
    }

    pub fn queue_submit_result(&self, result: RelayerResult<TxResult>) {
        self.submit_results.lock().unwrap().push_back(result);
    }

    pub fn queue_reinitialize_result(&self, result: RelayerResult<()>) {
        self.reinitialize_results.lock().unwrap().push_back(result);
    }

    pub fn set_client_state_result(&self, result: RelayerResult<ClientState>) {
        *self.client_state_result.lock().unwrap() = Some(result);
    }

    pub fn set_balance(&self, coins: Coins) {
        *self.balance.lock().unwrap() = coins;
    }

    pub fn reinitialize_calls(&self) -> Vec<(String, Duration)> {
        self.reinitialize_calls.lock().unwrap().clone()
    }

    pub fn registered_paths(&self) -> Vec<String> {
        self.registered_paths.lock().unwrap().clone()
    }

    pub fn submitted_messages(&self) -> Vec<Vec<RelayMsg>> {
        self.submitted_messages.lock().unwrap().clone()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn trust_call_count(&self) -> usize {
        self.call_log()
            .iter()
            .filter(|entry| entry.starts_with("update_trust:"))
            .count()
    }
}

#[async_trait]
impl ChainConnector for MockChain {
    async fn query_light_client_header(&self) -> RelayerResult<Header> {
        self.log("query_header");
        Ok(Header {
            chain_id: self.chain_id.clone(),
            height: 100,
            raw: serde_json::Value::Null,
        })
    }

    async fn query_client_state(&self) -> RelayerResult<ClientState> {
        self.log("query_client_state");
        match self.client_state_result.lock().unwrap().clone() {
            Some(result) => result,
            None => Ok(ClientState {
                latest_time: Some("2026-08-30T10:00:00Z".to_string()),
                raw: r#"{"time":"2026-08-30T10:00:00Z"}"#.to_string(),
            }),
        }
    }

    async fn update_light_client_trust(&self, _force: bool) -> RelayerResult<()> {
        self.log("update_trust");
        self.trust_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn register_client_path(
        &self,
        client_id: &str,
        _connection_id: &str,
        _channel_id: &str,
        _port_id: &str,
        _ordering: ChannelOrdering,
    ) -> RelayerResult<()> {
        self.log("register_path");
        self.registered_paths
            .lock()
            .unwrap()
            .push(client_id.to_string());
        Ok(())
    }

    async fn submit_messages(&self, msgs: Vec<RelayMsg>) -> RelayerResult<TxResult> {
        self.log("submit");
        self.submitted_messages.lock().unwrap().push(msgs);
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TxResult {
                height: 7,
                raw: "{}".to_string(),
            }))
    }

    async fn query_balance(&self, _key: &str) -> RelayerResult<Coins> {
        self.log("query_balance");
        Ok(self.balance.lock().unwrap().clone())
    }

    async fn signer_address(&self) -> RelayerResult<String> {
        self.log("signer_address");
        Ok(self.address.clone())
    }

    async fn reinitialize(
        &self,
        _home_path: &Path,
        rpc_addr: &str,
        timeout: Duration,
    ) -> RelayerResult<()> {
        self.log("reinitialize");
        self.reinitialize_calls
            .lock()
            .unwrap()
            .push((rpc_addr.to_string(), timeout));
        self.reinitialize_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
