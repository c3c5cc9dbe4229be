//! # Runtime Configuration
//!
//! Pipeline and simulator settings plus start-up switches, loaded from
//! `ORDER_SYNC_*` environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ORDER_SYNC_MAX_ATTEMPTS` | `3` | Failed attempts before dead-lettering |
//! | `ORDER_SYNC_SYNC_INTERVAL_MS` | `10000` | Fetch sweep interval |
//! | `ORDER_SYNC_RECONCILE_INTERVAL_MS` | `15000` | Reconciliation interval |
//! | `ORDER_SYNC_SUBMIT_TIMEOUT_MS` | `30000` | Destination call timeout, `0` disables |
//! | `ORDER_SYNC_HEALTH_THRESHOLD` | `5` | Mismatches tolerated while healthy |
//! | `ORDER_SYNC_WMS_LATENCY_MS` | `500` | Simulated destination latency |
//! | `ORDER_SYNC_WMS_FAILURE_RATE` | `0.05` | Baseline simulated failure rate |
//! | `ORDER_SYNC_WMS_RANDOM_FAILURE_RATE` | `0.5` | Failure rate for `FAIL_RANDOM` orders |
//! | `ORDER_SYNC_AUTO_START_SYNC` | `true` | Start the sync timer at boot |
//! | `ORDER_SYNC_AUTO_START_RECONCILE` | `true` | Start the reconcile timer at boot |
//! | `ORDER_SYNC_SEED_DEMO` | `false` | Inject the demo orders at boot |
//! | `ORDER_SYNC_DRAIN_TIMEOUT_MS` | `5000` | Queue drain budget on shutdown |

use std::str::FromStr;
use std::time::Duration;

use order_sync::{SimulatedDestinationConfig, SyncConfig};
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Retry policy, intervals, timeout and health threshold.
    pub sync: SyncConfig,
    /// Behaviour of the simulated destination.
    pub destination: SimulatedDestinationConfig,
    /// Start the fetch timer on boot.
    pub auto_start_sync: bool,
    /// Start the reconciliation timer on boot.
    pub auto_start_reconcile: bool,
    /// Inject the demo orders on boot.
    pub seed_demo_orders: bool,
    /// How long shutdown waits for queued jobs.
    pub drain_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            destination: SimulatedDestinationConfig::default(),
            auto_start_sync: true,
            auto_start_reconcile: true,
            seed_demo_orders: false,
            drain_timeout_ms: 5_000,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// A failure rate outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    RateOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// A zero interval would spin the timer.
    #[error("{field} must be greater than zero")]
    ZeroInterval {
        /// Offending field.
        field: &'static str,
    },

    /// At least one attempt is required before dead-lettering.
    #[error("max_attempts must be at least 1")]
    NoAttempts,
}

impl RuntimeConfig {
    /// Load from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_with(&lookup, "ORDER_SYNC_MAX_ATTEMPTS", &mut config.sync.max_attempts)?;
        override_with(&lookup, "ORDER_SYNC_SYNC_INTERVAL_MS", &mut config.sync.sync_interval_ms)?;
        override_with(
            &lookup,
            "ORDER_SYNC_RECONCILE_INTERVAL_MS",
            &mut config.sync.reconcile_interval_ms,
        )?;
        override_with(
            &lookup,
            "ORDER_SYNC_HEALTH_THRESHOLD",
            &mut config.sync.health_mismatch_threshold,
        )?;
        if let Some(raw) = lookup("ORDER_SYNC_SUBMIT_TIMEOUT_MS") {
            let ms: u64 = parse("ORDER_SYNC_SUBMIT_TIMEOUT_MS", &raw)?;
            config.sync.submit_timeout_ms = (ms > 0).then_some(ms);
        }

        override_with(&lookup, "ORDER_SYNC_WMS_LATENCY_MS", &mut config.destination.latency_ms)?;
        override_with(
            &lookup,
            "ORDER_SYNC_WMS_FAILURE_RATE",
            &mut config.destination.baseline_failure_rate,
        )?;
        override_with(
            &lookup,
            "ORDER_SYNC_WMS_RANDOM_FAILURE_RATE",
            &mut config.destination.random_scenario_failure_rate,
        )?;

        override_flag(&lookup, "ORDER_SYNC_AUTO_START_SYNC", &mut config.auto_start_sync)?;
        override_flag(
            &lookup,
            "ORDER_SYNC_AUTO_START_RECONCILE",
            &mut config.auto_start_reconcile,
        )?;
        override_flag(&lookup, "ORDER_SYNC_SEED_DEMO", &mut config.seed_demo_orders)?;
        override_with(&lookup, "ORDER_SYNC_DRAIN_TIMEOUT_MS", &mut config.drain_timeout_ms)?;

        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if self.sync.sync_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "sync_interval_ms",
            });
        }
        if self.sync.reconcile_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "reconcile_interval_ms",
            });
        }
        for (field, value) in [
            ("baseline_failure_rate", self.destination.baseline_failure_rate),
            (
                "random_scenario_failure_rate",
                self.destination.random_scenario_failure_rate,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Shutdown drain budget.
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn override_with<F, T>(lookup: &F, key: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = parse(key, &raw)?;
    }
    Ok(())
}

fn override_flag<F>(lookup: &F, key: &'static str, slot: &mut bool) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => return Err(ConfigError::InvalidValue { key, value: raw }),
        };
    }
    Ok(())
}
