//! # Sync Container
//!
//! Owns the record store and wires the adapters into `OrderSyncService`.
//!
//! ```text
//! InMemoryRecordStore ──┬── StoreBackedSource ──┐
//!                       ├── SimulatedDestination ┼── OrderSyncService
//!                       └───────────────────────┘
//! ```
//!
//! The store is created once here and handed to every component explicitly.

pub mod config;

pub use config::{ConfigError, RuntimeConfig};

use std::sync::Arc;

use order_sync::{
    InMemoryRecordStore, OrderSyncService, SimulatedDestination, StoreBackedSource,
    SystemTimeSource, TimeSource,
};
use tracing::info;

/// Central container holding the pipeline and its adapters.
pub struct SyncContainer {
    /// Shared record store for source, destination and sync records.
    pub store: Arc<InMemoryRecordStore>,
    /// Simulated downstream system, kept for failure-scenario toggles.
    pub destination: Arc<SimulatedDestination>,
    /// The pipeline.
    pub service: Arc<OrderSyncService>,
    /// Configuration the container was built from.
    pub config: RuntimeConfig,
}

impl SyncContainer {
    /// Build the pipeline on the wall clock.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Build the pipeline on an arbitrary clock.
    pub fn with_time_source(config: RuntimeConfig, time: Arc<dyn TimeSource>) -> Self {
        info!("[runtime] Wiring order-sync pipeline");

        let store = Arc::new(InMemoryRecordStore::new());
        let source = Arc::new(StoreBackedSource::new(store.clone()));
        let destination = Arc::new(SimulatedDestination::new(
            store.clone(),
            Arc::clone(&time),
            config.destination.clone(),
        ));
        let service = Arc::new(OrderSyncService::new(
            config.sync.clone(),
            store.clone(),
            source,
            destination.clone(),
            time,
        ));

        Self {
            store,
            destination,
            service,
            config,
        }
    }
}
