//! # Order-Sync Runtime
//!
//! The main entry point for the order-sync pipeline.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics)
//! 2. Load and validate configuration from `ORDER_SYNC_*` variables
//! 3. Wire store, adapters and service
//! 4. Start the queue worker
//! 5. Optionally seed demo orders
//! 6. Start the sync and reconcile timers
//!
//! ## Shutdown Sequence
//!
//! 1. Stop both timers
//! 2. Drain queued jobs (bounded by `ORDER_SYNC_DRAIN_TIMEOUT_MS`)
//! 3. Stop the worker and log the final health report

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use order_sync::OrderSyncApi;
use sync_runtime::container::{RuntimeConfig, SyncContainer};
use sync_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

/// The runtime owning the wired pipeline.
pub struct SyncRuntime {
    container: Arc<SyncContainer>,
}

impl SyncRuntime {
    /// Wire the pipeline. Nothing runs until `start`.
    pub fn new(config: RuntimeConfig) -> Self {
        info!("Creating order-sync runtime");
        Self {
            container: Arc::new(SyncContainer::new(config)),
        }
    }

    /// Start the worker, seed if asked, and start the timers.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Order-Sync Runtime v{}", order_sync::VERSION);
        info!("===========================================");

        let service = &self.container.service;
        let config = &self.container.config;
        service.start();

        if config.seed_demo_orders {
            self.seed_demo_orders()?;
        }
        if config.auto_start_sync {
            service.start_sync();
        }
        if config.auto_start_reconcile {
            service.start_reconcile();
        }

        info!("Sync interval: {}ms", config.sync.sync_interval_ms);
        info!("Reconcile interval: {}ms", config.sync.reconcile_interval_ms);
        info!("Max attempts: {}", config.sync.max_attempts);
        Ok(())
    }

    #[cfg(feature = "scenarios")]
    fn seed_demo_orders(&self) -> Result<()> {
        sync_runtime::demo::seed(self.container.service.as_ref())
            .context("failed to seed demo orders")?;
        Ok(())
    }

    #[cfg(not(feature = "scenarios"))]
    fn seed_demo_orders(&self) -> Result<()> {
        warn!("ORDER_SYNC_SEED_DEMO is set but the scenarios feature is disabled");
        Ok(())
    }

    /// Stop timers, drain the queue and report final state.
    pub async fn shutdown(&self) {
        let service = &self.container.service;
        service.shutdown(self.container.config.drain_timeout()).await;

        match serde_json::to_string(&service.system_health()) {
            Ok(health) => info!("Final health: {}", health),
            Err(e) => warn!("Could not render final health: {}", e),
        }
        let summary = service.summary();
        info!(
            in_sync = summary.in_sync,
            only_in_erp = summary.only_in_erp,
            only_in_wms = summary.only_in_wms,
            failed = summary.failed,
            "Final reconciliation"
        );
        match encode_metrics() {
            Ok(metrics) => debug!("Final metrics:\n{}", metrics),
            Err(e) => warn!("Could not encode metrics: {}", e),
        }
    }
}

/// Load and validate configuration from the environment.
fn load_config() -> Result<RuntimeConfig> {
    let config = RuntimeConfig::from_env().context("failed to read ORDER_SYNC_* variables")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = load_config()?;

    let runtime = SyncRuntime::new(config);
    runtime.start().await?;

    info!("Order-sync is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
