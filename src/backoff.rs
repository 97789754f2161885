// Copyright (c) Starcoin, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable backoff strategies for the unbounded retry loops.
//!
//! The daemon never gives up on a transient failure; the only tunable is
//! how long it sleeps between attempts. Call sites build a fresh strategy
//! per operation from a [`BackoffConfig`], so swapping fixed backoff for a
//! jittered exponential one is a configuration change, not a code change.

use backoff::backoff::Backoff;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 10;

/// Delay sequence between retries of one failing operation.
pub trait BackoffStrategy: Send {
    fn next_delay(&mut self) -> Duration;
}

/// The classic policy: a constant sleep between attempts.
#[derive(Debug, Clone)]
pub struct FixedBackoff {
    interval: Duration,
}

impl FixedBackoff {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS))
    }
}

impl BackoffStrategy for FixedBackoff {
    fn next_delay(&mut self) -> Duration {
        self.interval
    }
}

/// Jittered exponential backoff with a capped interval and no elapsed-time
/// limit (the retry loops are unbounded by design).
pub struct JitteredExponentialBackoff {
    inner: backoff::ExponentialBackoff,
}

impl JitteredExponentialBackoff {
    pub fn new(initial: Duration, max_interval: Duration) -> Self {
        let inner = backoff::ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            randomization_factor: 0.1,
            multiplier: 2.0,
            max_interval,
            max_elapsed_time: None,
            ..Default::default()
        };
        Self { inner }
    }
}

impl BackoffStrategy for JitteredExponentialBackoff {
    fn next_delay(&mut self) -> Duration {
        // max_elapsed_time is None so next_backoff never runs out
        self.inner.next_backoff().unwrap_or(self.inner.max_interval)
    }
}

/// Operator-facing backoff selection, part of the global config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum BackoffConfig {
    #[serde(rename_all = "kebab-case")]
    Fixed {
        #[serde(default = "default_interval_secs")]
        interval_secs: u64,
    },
    #[serde(rename_all = "kebab-case")]
    Exponential {
        #[serde(default = "default_initial_millis")]
        initial_millis: u64,
        #[serde(default = "default_max_interval_secs")]
        max_interval_secs: u64,
    },
}

fn default_interval_secs() -> u64 {
    DEFAULT_RETRY_INTERVAL_SECS
}

fn default_initial_millis() -> u64 {
    400
}

fn default_max_interval_secs() -> u64 {
    120
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig::Fixed {
            interval_secs: DEFAULT_RETRY_INTERVAL_SECS,
        }
    }
}

impl BackoffConfig {
    pub fn build(&self) -> Box<dyn BackoffStrategy> {
        match self {
            BackoffConfig::Fixed { interval_secs } => {
                Box::new(FixedBackoff::new(Duration::from_secs(*interval_secs)))
            }
            BackoffConfig::Exponential {
                initial_millis,
                max_interval_secs,
            } => Box::new(JitteredExponentialBackoff::new(
                Duration::from_millis(*initial_millis),
                Duration::from_secs(*max_interval_secs),
            )),
        }
    }
}
