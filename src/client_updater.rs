// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Client-update submission with the shared retry/failover discipline.

use std::sync::Arc;
use tracing::{debug, info};

use crate::chain::ChainEndpoint;
use crate::config::PathEndConfig;
use crate::error::{RelayerError, RelayerResult};
use crate::retry::FailoverRetry;
use crate::types::RelayMsg;

pub struct ClientUpdater {
    retry: Arc<FailoverRetry>,
}

impl ClientUpdater {
    pub fn new(retry: Arc<FailoverRetry>) -> Self {
        Self { retry }
    }

    /// Advance `src`'s on-chain light-client record of `dst` to `dst`'s
    /// latest verified header. Rotation on failure applies to `src`, the
    /// chain the transaction is submitted on.
    pub async fn update(
        &self,
        src: &ChainEndpoint,
        dst: &ChainEndpoint,
        path_name: &str,
        end: &PathEndConfig,
    ) -> RelayerResult<()> {
        info!(
            src = src.chain_id(),
            dst = dst.chain_id(),
            path = path_name,
            client_id = %end.client_id,
            "client updating"
        );
        self.retry
            .run(src, "client-update", || self.update_once(src, dst, end))
            .await?;
        info!(
            src = src.chain_id(),
            dst = dst.chain_id(),
            path = path_name,
            client_id = %end.client_id,
            "client updated"
        );
        Ok(())
    }

    async fn update_once(
        &self,
        src: &ChainEndpoint,
        dst: &ChainEndpoint,
        end: &PathEndConfig,
    ) -> RelayerResult<()> {
        src.connector()
            .register_client_path(
                &end.client_id,
                &end.connection_id,
                &end.channel_id,
                &end.port_id,
                end.ordering,
            )
            .await?;

        let header = dst.connector().query_light_client_header().await?;
        let signer = src.connector().signer_address().await?;
        let result = src
            .connector()
            .submit_messages(vec![RelayMsg::UpdateClient {
                client_id: end.client_id.clone(),
                signer,
                header,
            }])
            .await?;

        // A zero height means the tx never made it into a block even
        // though the broadcast itself did not error
        if result.height == 0 {
            return Err(RelayerError::TxNotIncluded);
        }
        debug!(height = result.height, raw = %result.raw, "update client tx included");
        Ok(())
    }
}
