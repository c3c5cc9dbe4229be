//! Prometheus metrics for the order-sync pipeline.
//!
//! All metrics follow the naming convention: `order_sync_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., jobs_total)
//! - **Gauge**: Value that can go up or down (e.g., queue_depth)
//! - **Histogram**: Distribution of values (e.g., submit_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // JOB QUEUE
    // =========================================================================

    /// Jobs finished by the worker
    pub static ref JOBS_PROCESSED: CounterVec = CounterVec::new(
        Opts::new("order_sync_jobs_total", "Jobs finished by the queue worker"),
        &["kind", "result"]  // kind: FETCH_ORDERS/SYNC_ORDER, result: ok/error/panic
    ).expect("metric creation failed");

    /// Jobs enqueued but not yet started
    pub static ref QUEUE_DEPTH: Gauge = Gauge::new(
        "order_sync_queue_depth",
        "Number of jobs waiting in the queue"
    ).expect("metric creation failed");

    // =========================================================================
    // SYNC ORCHESTRATOR
    // =========================================================================

    /// Submission attempts by outcome
    pub static ref SYNC_ATTEMPTS: CounterVec = CounterVec::new(
        Opts::new("order_sync_attempts_total", "Destination submission attempts"),
        &["outcome"]  // outcome: acknowledged/failed/dead_letter
    ).expect("metric creation failed");

    /// Dead-letter replays accepted
    pub static ref REPLAYS: Counter = Counter::new(
        "order_sync_replays_total",
        "Dead-lettered orders replayed"
    ).expect("metric creation failed");

    /// Destination submission latency
    pub static ref SUBMIT_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "order_sync_submit_duration_seconds",
            "Time spent waiting on the destination system"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // RECONCILIATION
    // =========================================================================

    /// Mismatches found by the last reconciliation check
    pub static ref RECONCILE_MISMATCHES: Gauge = Gauge::new(
        "order_sync_reconcile_mismatches",
        "Mismatch count from the most recent reconciliation"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Queue
        Box::new(JOBS_PROCESSED.clone()),
        Box::new(QUEUE_DEPTH.clone()),
        // Orchestrator
        Box::new(SYNC_ATTEMPTS.clone()),
        Box::new(REPLAYS.clone()),
        Box::new(SUBMIT_DURATION.clone()),
        // Reconciliation
        Box::new(RECONCILE_MISMATCHES.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
