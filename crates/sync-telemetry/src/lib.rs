//! # Sync Telemetry
//!
//! Observability for the order-sync pipeline.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with env filter, JSON or pretty output
//! - **Metrics**: Prometheus counters/gauges/histograms for queue, orchestrator
//!   and reconciliation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sync_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `order-sync` | Service name in logs |
//! | `ORDER_SYNC_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `ORDER_SYNC_JSON_LOGS` | `false` | JSON output (defaults on in containers) |
//! | `ORDER_SYNC_CONSOLE_OUTPUT` | `true` | Disable to silence stdout |
//! | `ORDER_SYNC_ENVIRONMENT` | `dev` | Environment tag |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, JOBS_PROCESSED,
    QUEUE_DEPTH, RECONCILE_MISMATCHES, REPLAYS, SUBMIT_DURATION, SYNC_ATTEMPTS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so that anything logged during startup is also counted
    let metrics_handle = register_metrics()?;

    init_logging(&config)?;

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for setting a gauge.
#[macro_export]
macro_rules! metric_set {
    ($metric:expr, $value:expr) => {
        $metric.set($value as f64)
    };
}
