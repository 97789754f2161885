// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios across checker, updater and scheduler.

use axum::{routing::post, Router};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::BackoffConfig;
use crate::chain::ChainEndpoint;
use crate::client_updater::ClientUpdater;
use crate::config::{ChainConfig, PathConfig};
use crate::endpoint_pool::EndpointPool;
use crate::error::RelayerError;
use crate::health_checker::HealthChecker;
use crate::metrics::RelayerMetrics;
use crate::mock_chain::MockChain;
use crate::retry::FailoverRetry;
use crate::scheduler::ReconcileScheduler;
use crate::status_collector::ClientStatusCollector;

const HUB_CHAIN_ID: &str = "hubchain-1";
const POOL: [&str; 3] = [
    "35.233.155.199:26657",
    "http://34.83.218.4:26657",
    "http://34.83.90.172:26656",
];

async fn spawn_faucet() -> u16 {
    let app = Router::new().route("/", post(|| async { "funds dispatched" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    port
}

fn endpoint(chain_id: &str, mock: &MockChain) -> Arc<ChainEndpoint> {
    let config = ChainConfig {
        chain_id: chain_id.to_string(),
        rpc_addr: "http://127.0.0.1:26657".to_string(),
        key: "testkey".to_string(),
        timeout: Some("10s".to_string()),
    };
    Arc::new(ChainEndpoint::new(
        &config,
        "10s",
        Path::new(".relayer-bot"),
        Arc::new(mock.clone()),
    ))
}

fn retry() -> Arc<FailoverRetry> {
    Arc::new(FailoverRetry::new(
        Arc::new(EndpointPool::new(POOL.iter().map(|s| s.to_string()).collect()).unwrap()),
        HUB_CHAIN_ID,
        BackoffConfig::Fixed { interval_secs: 0 },
        Arc::new(RelayerMetrics::new_for_testing()),
    ))
}

fn path_chains() -> Vec<String> {
    vec![HUB_CHAIN_ID.to_string(), "chainB-3".to_string()]
}

fn fail_trust_twice(mock: &MockChain) {
    mock.queue_trust_result(Err(RelayerError::Rpc("node unreachable".to_string())));
    mock.queue_trust_result(Err(RelayerError::Rpc("node unreachable".to_string())));
}

#[tokio::test]
async fn test_hub_chain_rotates_exactly_twice_before_success() {
    let checker = HealthChecker::new(retry(), path_chains());
    let hub_mock = MockChain::new(HUB_CHAIN_ID);
    let hub = endpoint(HUB_CHAIN_ID, &hub_mock);
    fail_trust_twice(&hub_mock);

    checker.check(&hub).await.unwrap();

    assert_eq!(hub_mock.trust_call_count(), 3);
    let rotations: Vec<String> = hub_mock
        .reinitialize_calls()
        .into_iter()
        .map(|(addr, _)| addr)
        .collect();
    assert_eq!(rotations, vec![POOL[0].to_string(), POOL[1].to_string()]);
    assert_eq!(hub.rpc_addr(), POOL[1]);
}

#[tokio::test]
async fn test_non_hub_chain_keeps_original_address_under_same_failures() {
    let faucet_port = spawn_faucet().await;
    let checker = HealthChecker::new(retry(), path_chains()).with_faucet_port(faucet_port);
    let b_mock = MockChain::new("chainB-3");
    let chain_b = endpoint("chainB-3", &b_mock);
    fail_trust_twice(&b_mock);

    checker.check(&chain_b).await.unwrap();

    assert_eq!(b_mock.trust_call_count(), 3);
    assert!(b_mock.reinitialize_calls().is_empty());
    assert_eq!(chain_b.rpc_addr(), "http://127.0.0.1:26657");
}

#[tokio::test]
async fn test_full_cycle_survives_hub_failures_and_updates_both_directions() {
    let faucet_port = spawn_faucet().await;
    let retry = retry();
    let checker = HealthChecker::new(retry.clone(), path_chains()).with_faucet_port(faucet_port);
    let updater = ClientUpdater::new(retry);

    let hub_mock = MockChain::new(HUB_CHAIN_ID);
    let b_mock = MockChain::new("chainB-3");
    let hub = endpoint(HUB_CHAIN_ID, &hub_mock);
    let chain_b = endpoint("chainB-3", &b_mock);
    fail_trust_twice(&hub_mock);

    let path: PathConfig = serde_yaml::from_str(
        r#"
src:
  chain-id: hubchain-1
  client-id: srcclient
  connection-id: srcconn
  channel-id: srcchan
dst:
  chain-id: chainB-3
  client-id: dstclient
  connection-id: dstconn
  channel-id: dstchan
"#,
    )
    .unwrap();

    let collector = Arc::new(ClientStatusCollector::new());
    let metrics = Arc::new(RelayerMetrics::new_for_testing());
    let scheduler = ReconcileScheduler::new(
        "chainA2chainB",
        path,
        hub.clone(),
        chain_b.clone(),
        checker,
        updater,
        collector,
        metrics.clone(),
        Duration::from_secs(600),
    );

    scheduler.run_cycle().await;

    // hub failover happened during the health check phase
    assert_eq!(hub.rpc_addr(), POOL[1]);
    assert_eq!(chain_b.rpc_addr(), "http://127.0.0.1:26657");
    // both update directions submitted exactly one batch each
    assert_eq!(hub_mock.submitted_messages().len(), 1);
    assert_eq!(b_mock.submitted_messages().len(), 1);
    assert_eq!(metrics.cycles_completed.get(), 1);
}

#[tokio::test]
async fn test_configuration_fault_defers_cycle_without_updates() {
    let retry = retry();
    let checker = HealthChecker::new(retry.clone(), path_chains());
    let updater = ClientUpdater::new(retry);

    let hub_mock = MockChain::new(HUB_CHAIN_ID);
    let b_mock = MockChain::new("chainB-3");
    let hub = endpoint(HUB_CHAIN_ID, &hub_mock);
    let chain_b = endpoint("chainB-3", &b_mock);
    // first failure triggers rotation; the re-validation then fails,
    // which is a configuration fault
    hub_mock.queue_trust_result(Err(RelayerError::Rpc("node unreachable".to_string())));
    hub_mock.queue_reinitialize_result(Err(RelayerError::Rpc("bad node".to_string())));

    let path: PathConfig = serde_yaml::from_str(
        r#"
src:
  chain-id: hubchain-1
  client-id: srcclient
  connection-id: srcconn
  channel-id: srcchan
dst:
  chain-id: chainB-3
  client-id: dstclient
  connection-id: dstconn
  channel-id: dstchan
"#,
    )
    .unwrap();

    let metrics = Arc::new(RelayerMetrics::new_for_testing());
    let scheduler = ReconcileScheduler::new(
        "chainA2chainB",
        path,
        hub,
        chain_b,
        checker,
        updater,
        Arc::new(ClientStatusCollector::new()),
        metrics.clone(),
        Duration::from_secs(600),
    );

    scheduler.run_cycle().await;

    // the cycle was deferred: no updates ran, nothing completed
    assert!(hub_mock.submitted_messages().is_empty());
    assert!(b_mock.submitted_messages().is_empty());
    assert_eq!(metrics.cycles_completed.get(), 0);
}
