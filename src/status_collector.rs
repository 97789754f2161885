// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pull-based status gauge for client-update observations.
//!
//! Keeps the most recently observed (status, timestamp) pair per chain
//! identifier and exports them on every scrape as the
//! `client_update_status` gauge with `time` and `chain_id` labels. This is
//! a gauge, not a log: every observation overwrites the previous one.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGaugeVec, Opts};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub const CLIENT_UPDATE_STATUS_METRIC: &str = "client_update_status";
const CLIENT_UPDATE_STATUS_HELP: &str = "Status of relayer client update";

/// Observed status code for a successful check.
pub const STATUS_OK: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: i64,
    pub time: String,
}

/// Concurrency-safe last-write-wins mapping from chain identifier to the
/// latest [`StatusRecord`].
///
/// One read-write lock guards the whole map: writers hold the write lock
/// for a single upsert, the exporter holds the read lock while copying the
/// records out. Writes happen about once a minute per chain, so coarse
/// locking is fine.
#[derive(Debug, Clone)]
pub struct ClientStatusCollector {
    desc: Desc,
    records: Arc<RwLock<HashMap<String, StatusRecord>>>,
}

impl Default for ClientStatusCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStatusCollector {
    pub fn new() -> Self {
        let desc = Desc::new(
            CLIENT_UPDATE_STATUS_METRIC.to_string(),
            CLIENT_UPDATE_STATUS_HELP.to_string(),
            vec!["time".to_string(), "chain_id".to_string()],
            HashMap::new(),
        )
        .unwrap();
        Self {
            desc,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Upsert the record for `chain_id`. Last write wins.
    pub fn record(&self, status: i64, time: impl Into<String>, chain_id: impl Into<String>) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(
            chain_id.into(),
            StatusRecord {
                status,
                time: time.into(),
            },
        );
    }

    /// Consistent copy of all current records.
    pub fn snapshot(&self) -> HashMap<String, StatusRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.clone()
    }
}

impl Collector for ClientStatusCollector {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let gauge = IntGaugeVec::new(
            Opts::new(CLIENT_UPDATE_STATUS_METRIC, CLIENT_UPDATE_STATUS_HELP),
            &["time", "chain_id"],
        )
        .unwrap();
        for (chain_id, record) in self.snapshot() {
            gauge
                .with_label_values(&[&record.time, &chain_id])
                .set(record.status);
        }
        gauge.collect()
    }
}
