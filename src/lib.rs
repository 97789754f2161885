// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod backoff;
pub mod chain;
pub mod client_updater;
pub mod config;
pub mod endpoint_pool;
pub mod error;
pub mod health_checker;
pub mod json_rpc_chain;
pub mod metrics;
pub mod node;
pub mod retry;
pub mod scheduler;
pub mod status_collector;
pub mod types;

#[cfg(test)]
pub mod mock_chain;

#[cfg(test)]
pub mod e2e_tests;
