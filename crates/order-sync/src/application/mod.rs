//! # Application Module
//!
//! The job queue, the per-order orchestrator, reconciliation, the interval
//! scheduler, and `OrderSyncService` tying them together.

pub mod orchestrator;
pub mod queue;
pub mod reconciliation;
pub mod scheduler;
pub mod service;

pub use orchestrator::SyncOrchestrator;
pub use queue::{JobHandler, JobQueue, JobWorker};
pub use reconciliation::ReconciliationEngine;
pub use scheduler::Scheduler;
pub use service::{format_timestamp, OrderSyncService};
