// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Static pool of alternate RPC addresses for the hub chain.

use crate::error::{RelayerError, RelayerResult};

/// An ordered, fixed-size list of known-good RPC addresses.
///
/// Selection never fails: each failing operation keeps its own attempt
/// counter starting at zero and the pool wraps around modulo its size.
/// An empty pool is a configuration error caught at construction time.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    addrs: Vec<String>,
}

impl EndpointPool {
    pub fn new(addrs: Vec<String>) -> RelayerResult<Self> {
        if addrs.is_empty() {
            return Err(RelayerError::InvalidConfig(
                "hub endpoint pool is empty".to_string(),
            ));
        }
        Ok(Self { addrs })
    }

    /// RPC address for the `attempt`-th failover of one operation.
    pub fn select(&self, attempt: usize) -> &str {
        &self.addrs[attempt % self.addrs.len()]
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
