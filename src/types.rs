// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Opaque data types exchanged with the Chain collaborator.
//!
//! The daemon never looks inside headers or client states beyond the few
//! fields it needs for staleness reporting and inclusion checks; everything
//! else is carried as raw JSON.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RelayerError;

/// A verified light-client header fetched from a counterparty chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub chain_id: String,
    pub height: u64,
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// On-chain light-client state for a counterparty.
///
/// `latest_time` is populated when the collaborator models the state as
/// structured data. `raw` keeps the serialized form for collaborators that
/// only return an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default)]
    pub latest_time: Option<String>,
    pub raw: String,
}

/// Result of a submitted transaction. A `height` of zero means the
/// transaction was not included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub height: u64,
    #[serde(default)]
    pub raw: String,
}

/// Messages the daemon submits through a Chain collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMsg {
    UpdateClient {
        client_id: String,
        signer: String,
        header: Header,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins(pub Vec<Coin>);

impl Coins {
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|c| c.amount == 0)
    }
}

/// Channel ordering mode of a relay path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelOrdering {
    #[default]
    Ordered,
    Unordered,
}

impl fmt::Display for ChannelOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelOrdering::Ordered => write!(f, "ORDERED"),
            ChannelOrdering::Unordered => write!(f, "UNORDERED"),
        }
    }
}

impl FromStr for ChannelOrdering {
    type Err = RelayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORDERED" => Ok(ChannelOrdering::Ordered),
            "UNORDERED" => Ok(ChannelOrdering::Unordered),
            other => Err(RelayerError::InvalidConfig(format!(
                "unknown channel ordering {other:?}"
            ))),
        }
    }
}

/// Body of the test-fund allocation request sent to a faucet endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetRequest {
    pub address: String,
    pub chain_id: String,
}

// Compatibility shim for collaborators that only return the serialized
// client state: pull the embedded consensus timestamp out of the blob.
static CLIENT_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""time":"(?P<time>.*?)""#).unwrap());

/// Last-observed consensus time of a client state, preferring the structured
/// field over the serialized-blob fallback.
pub fn latest_client_time(state: &ClientState) -> Option<String> {
    if let Some(time) = &state.latest_time {
        return Some(time.clone());
    }
    CLIENT_TIME_RE
        .captures(&state.raw)
        .and_then(|caps| caps.name("time"))
        .map(|m| m.as_str().to_string())
}
