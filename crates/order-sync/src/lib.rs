//! # Order Sync
//!
//! Keeps orders flowing from an upstream order system (ERP) into a
//! downstream fulfillment system (WMS) and reports where the two drift apart.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Pipeline
//!
//! 1. A fetch job pulls source orders not yet tracked and re-queues
//!    `PENDING_SYNC`/`FAILED` records still under the attempt limit.
//! 2. A sync job transforms one order and submits it downstream. Success
//!    acknowledges the record; failure counts an attempt, and the third
//!    failed attempt parks it in the dead-letter state.
//! 3. Dead-lettered records stay put until an operator replays them.
//! 4. Reconciliation diffs the three record sets and never writes.
//!
//! All jobs go through one FIFO queue with a single worker, so at most one
//! downstream call is in flight.
//!
//! ## Sync States
//!
//! | State | Retried by sweep | Terminal |
//! |-------|------------------|----------|
//! | `PENDING_SYNC` | yes | no |
//! | `FAILED` | yes (under limit) | no |
//! | `ACKNOWLEDGED_BY_WMS` | no | yes |
//! | `DEAD_LETTER` | no (replay only) | yes |
//!
//! ## Module Structure
//!
//! ```text
//! order-sync/
//! ├── domain/          # Orders, SyncRecord state machine, views, errors
//! ├── algorithms/      # Source → destination transform, reconciliation diff
//! ├── ports/           # OrderSyncApi (inbound) + store/systems/clock (outbound)
//! ├── adapters/        # In-memory store, store-backed source, simulated WMS
//! ├── application/     # Queue, orchestrator, reconciliation, scheduler, service
//! └── config.rs        # SyncConfig, SimulatedDestinationConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryRecordStore, SimulatedDestination, StoreBackedSource};
pub use algorithms::{itemize, summarize, to_submission};
pub use application::{
    JobHandler, JobQueue, JobWorker, OrderSyncService, ReconciliationEngine, Scheduler,
    SyncOrchestrator,
};
pub use config::{SimulatedDestinationConfig, SyncConfig};
#[cfg(feature = "scenarios")]
pub use domain::Scenario;
pub use domain::{
    ComponentStatus, DeadLetterView, DeliveryAddress, DestinationItem, DestinationOrder,
    DestinationStatus, Discrepancy, DiscrepancyKind, IssueStatus, Job, JobKind, OrderLine,
    OrderStatus, OrderSubline, OrderSubmission, OrderView, ProductRef, ReconciliationSummary,
    SourceOrder, StoreSnapshot, SubmitOutcome, SweepReport, SyncError, SyncRecord, SyncState,
    SystemHealth, Timestamp, DEAD_LETTER_PREFIX, MAX_SYNC_ATTEMPTS,
};
pub use ports::{
    DestinationSystem, MockTimeSource, OrderSyncApi, RecordStore, ScriptedDestination,
    ScriptedMode, SourceSystem, SystemTimeSource, TimeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
