// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Static configuration surface of the daemon.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::backoff::BackoffConfig;
use crate::error::{RelayerError, RelayerResult};
use crate::types::ChannelOrdering;

/// Load/save helpers for file-backed configs. YAML and JSON are both
/// accepted, selected by file extension.
pub trait Config: Serialize + DeserializeOwned {
    fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path.extension().and_then(|s| s.to_str());
        let config: Self = if matches!(extension, Some("yaml") | Some("yml")) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|s| s.to_str());
        let content = if matches!(extension, Some("yaml") | Some("yml")) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Per-chain RPC timeout as a duration string, e.g. "10s". Parsed at
    /// endpoint re-validation time, not at load time.
    pub timeout: String,
    /// Chain identifier granted endpoint-rotation privileges.
    pub hub_chain_id: String,
    /// Static pool of alternate RPC addresses for the hub chain.
    pub hub_endpoints: Vec<String>,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainConfig {
    pub chain_id: String,
    pub rpc_addr: String,
    /// Name of the signing key in the external keyring.
    pub key: String,
    /// Optional per-chain override of the global timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// One end of a relay path. Client identifiers are assigned at
/// path-creation time and immutable afterwards.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathEndConfig {
    pub chain_id: String,
    pub client_id: String,
    pub connection_id: String,
    pub channel_id: String,
    #[serde(default = "default_port_id")]
    pub port_id: String,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub ordering: ChannelOrdering,
}

fn default_port_id() -> String {
    "transfer".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathConfig {
    pub src: PathEndConfig,
    pub dst: PathEndConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayerBotConfig {
    pub global: GlobalConfig,
    pub chains: Vec<ChainConfig>,
    pub paths: BTreeMap<String, PathConfig>,
}

impl Config for RelayerBotConfig {}

impl RelayerBotConfig {
    pub fn chain(&self, chain_id: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    pub fn path(&self, name: &str) -> RelayerResult<&PathConfig> {
        self.paths
            .get(name)
            .ok_or_else(|| RelayerError::InvalidConfig(format!("unknown path {name:?}")))
    }

    /// Effective RPC timeout of a chain: the per-chain override when
    /// present, the global default otherwise.
    pub fn chain_timeout(&self, chain: &ChainConfig) -> RelayerResult<Duration> {
        let value = chain.timeout.as_deref().unwrap_or(&self.global.timeout);
        humantime::parse_duration(value).map_err(|e| RelayerError::InvalidTimeout {
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Startup validation. Anything caught here is fatal before the
    /// scheduler loops start.
    pub fn validate(&self) -> RelayerResult<()> {
        if self.global.hub_endpoints.is_empty() {
            return Err(RelayerError::InvalidConfig(
                "hub endpoint pool is empty".to_string(),
            ));
        }
        for (name, path) in &self.paths {
            if path.src.chain_id == path.dst.chain_id {
                return Err(RelayerError::InvalidConfig(format!(
                    "path {name:?} connects {0} to itself",
                    path.src.chain_id
                )));
            }
            for end in [&path.src, &path.dst] {
                if self.chain(&end.chain_id).is_none() {
                    return Err(RelayerError::InvalidConfig(format!(
                        "path {name:?} references unknown chain {0:?}",
                        end.chain_id
                    )));
                }
            }
        }
        Ok(())
    }
}
