//! # Order Sync Configuration
//!
//! Retry policy, timer intervals and simulated-destination behaviour.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::MAX_SYNC_ATTEMPTS;

/// Pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Failed attempts before a record is dead-lettered.
    pub max_attempts: u32,

    /// Fetch sweep interval in milliseconds.
    pub sync_interval_ms: u64,

    /// Reconciliation check interval in milliseconds.
    pub reconcile_interval_ms: u64,

    /// Upper bound on one destination call. `None` waits forever, which lets a
    /// hanging destination stall the queue.
    pub submit_timeout_ms: Option<u64>,

    /// Mismatches tolerated before `system_health` reports unhealthy.
    pub health_mismatch_threshold: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_SYNC_ATTEMPTS,
            sync_interval_ms: 10_000,
            reconcile_interval_ms: 15_000,
            submit_timeout_ms: Some(30_000),
            health_mismatch_threshold: 5,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (short intervals).
    pub fn for_testing() -> Self {
        Self {
            max_attempts: MAX_SYNC_ATTEMPTS,
            sync_interval_ms: 100,
            reconcile_interval_ms: 150,
            submit_timeout_ms: Some(1_000),
            health_mismatch_threshold: 5,
        }
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms)
    }

    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_ms.map(Duration::from_millis)
    }
}

/// Behaviour of the in-process destination simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDestinationConfig {
    /// Artificial latency per submission in milliseconds.
    pub latency_ms: u64,

    /// Probability that an untagged order fails.
    pub baseline_failure_rate: f64,

    /// Probability that a `FAIL_RANDOM` order fails.
    pub random_scenario_failure_rate: f64,
}

impl Default for SimulatedDestinationConfig {
    fn default() -> Self {
        Self {
            latency_ms: 500,
            baseline_failure_rate: 0.05,
            random_scenario_failure_rate: 0.5,
        }
    }
}

impl SimulatedDestinationConfig {
    /// Deterministic simulator: no latency, untagged orders always succeed.
    pub fn for_testing() -> Self {
        Self {
            latency_ms: 0,
            baseline_failure_rate: 0.0,
            random_scenario_failure_rate: 0.5,
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
