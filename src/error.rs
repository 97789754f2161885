// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type RelayerResult<T> = Result<T, RelayerError>;

/// Errors produced by the reconciliation core.
///
/// The retry loops only care about one distinction: transient errors are
/// retried forever with backoff, configuration errors abort the current
/// cycle and surface to the scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayerError {
    // RPC endpoint unreachable or returned an error response
    #[error("rpc error: {0}")]
    Rpc(String),
    // Faucet funding request failed (network error or non-2xx)
    #[error("faucet request failed: {0}")]
    Faucet(String),
    // Light client trust root could not be refreshed
    #[error("light client refresh failed: {0}")]
    LightClient(String),
    // Transaction was accepted on the wire but not included in a block
    #[error("transaction not included (height = 0)")]
    TxNotIncluded,
    // Malformed timeout duration string in chain configuration
    #[error("malformed timeout {value:?}: {reason}")]
    InvalidTimeout { value: String, reason: String },
    // Endpoint re-initialization failed after an RPC address swap
    #[error("re-initialization of {chain_id} failed: {reason}")]
    Reinitialize { chain_id: String, reason: String },
    // Bad static configuration, detected at startup
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    // Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayerError {
    /// Configuration faults abort the surrounding retry loop immediately
    /// instead of being retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RelayerError::InvalidTimeout { .. }
                | RelayerError::Reinitialize { .. }
                | RelayerError::InvalidConfig(_)
        )
    }

    pub fn is_transient(&self) -> bool {
        !self.is_configuration()
    }
}
