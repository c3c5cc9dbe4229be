//! # Inbound Ports
//!
//! API trait defining what the order-sync pipeline offers to the API layer
//! and dashboards.

use crate::domain::{
    DeadLetterView, DestinationOrder, Discrepancy, OrderView, ReconciliationSummary,
    SourceOrder, SyncError, SystemHealth,
};
#[cfg(feature = "scenarios")]
use crate::domain::Scenario;

/// Order sync API - inbound port.
///
/// Every call returns promptly: enqueues are fire-and-forget and reads work
/// on a snapshot. Timer control must be called from within a Tokio runtime.
pub trait OrderSyncApi: Send + Sync {
    /// Queue a fetch sweep.
    fn enqueue_fetch(&self) -> Result<(), SyncError>;

    /// Queue one order for synchronization.
    fn enqueue_sync(&self, order: SourceOrder) -> Result<(), SyncError>;

    /// One row per source order (`PENDING_PULL` until tracked), followed by
    /// sync records whose source order was never stored.
    fn list_orders(&self) -> Vec<OrderView>;

    /// Dead-lettered records, in sync record insertion order.
    fn list_dead_letters(&self) -> Vec<DeadLetterView>;

    /// Revive a dead-lettered record and queue it again.
    ///
    /// Returns `false` for unknown ids and records in any other state.
    fn replay(&self, sync_id: &str) -> bool;

    fn summary(&self) -> ReconciliationSummary;

    fn detailed_report(&self) -> Vec<Discrepancy>;

    /// Run a reconciliation check now, alerting like the timer does.
    fn reconcile_now(&self) -> ReconciliationSummary;

    /// Jobs enqueued but not yet started.
    fn queue_length(&self) -> usize;

    fn is_sync_enabled(&self) -> bool;

    fn is_reconcile_enabled(&self) -> bool;

    /// Start the fetch timer; fires one fetch immediately. No-op if running.
    fn start_sync(&self);

    fn stop_sync(&self);

    /// Start the reconciliation timer. No-op if running.
    fn start_reconcile(&self);

    fn stop_reconcile(&self);

    fn system_health(&self) -> SystemHealth;

    /// Raw source records.
    fn debug_source_orders(&self) -> Vec<SourceOrder>;

    /// Raw destination records.
    fn debug_destination_orders(&self) -> Vec<DestinationOrder>;

    /// Write an order straight into the source record set.
    ///
    /// The scenario may rewrite the id to trigger simulated destination
    /// failures; the effective id is returned.
    #[cfg(feature = "scenarios")]
    fn inject_source_order(
        &self,
        order: SourceOrder,
        scenario: Option<Scenario>,
    ) -> Result<String, SyncError>;
}
