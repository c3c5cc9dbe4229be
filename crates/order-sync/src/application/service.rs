//! # Order Sync Service
//!
//! Application service wiring the queue, orchestrator, reconciliation engine
//! and scheduler around one explicitly owned record store, and exposing them
//! through `OrderSyncApi`.

use chrono::{SecondsFormat, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{JobQueue, JobWorker, ReconciliationEngine, Scheduler, SyncOrchestrator};
use crate::config::SyncConfig;
use crate::domain::{
    ComponentStatus, DeadLetterView, DestinationOrder, Discrepancy, JobKind, JobsHealth,
    OrderStatus, OrderView, QueueHealth, ReconciliationSummary, SourceOrder, SyncError,
    SyncRecord, SyncState, SystemHealth, Timestamp, UNKNOWN_ERROR,
};
#[cfg(feature = "scenarios")]
use crate::domain::Scenario;
use crate::ports::{DestinationSystem, OrderSyncApi, RecordStore, SourceSystem, TimeSource};

/// Order Sync Service - the pipeline behind `OrderSyncApi`.
pub struct OrderSyncService {
    config: SyncConfig,
    store: Arc<dyn RecordStore>,
    queue: JobQueue,
    orchestrator: Arc<SyncOrchestrator>,
    reconciliation: Arc<ReconciliationEngine>,
    scheduler: Scheduler,
    /// Taken by `start`.
    worker: Mutex<Option<JobWorker>>,
    worker_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl OrderSyncService {
    /// Wire the pipeline. Nothing runs until `start`.
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn RecordStore>,
        source: Arc<dyn SourceSystem>,
        destination: Arc<dyn DestinationSystem>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let (queue, worker) = JobQueue::new();
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&store),
            source,
            destination,
            queue.clone(),
            time,
            &config,
        ));
        let reconciliation = Arc::new(ReconciliationEngine::new(Arc::clone(&store)));
        let scheduler = Scheduler::new(
            queue.clone(),
            Arc::clone(&reconciliation),
            config.sync_interval(),
            config.reconcile_interval(),
        );
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            store,
            queue,
            orchestrator,
            reconciliation,
            scheduler,
            worker: Mutex::new(Some(worker)),
            worker_task: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Spawn the queue worker. Returns false if it was already started.
    pub fn start(&self) -> bool {
        let Some(worker) = self.worker.lock().take() else {
            return false;
        };
        let handle = worker.spawn(
            Arc::clone(&self.orchestrator) as Arc<dyn super::JobHandler>,
            self.shutdown_tx.subscribe(),
        );
        *self.worker_task.lock() = Some(handle);
        info!("[order-sync] Service started");
        true
    }

    /// Resolves once the queue has drained, including follow-up jobs.
    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await;
    }

    /// Stop both timers, let queued work finish for at most `drain`, then
    /// stop the worker.
    pub async fn shutdown(&self, drain: Duration) {
        info!("[order-sync] Initiating graceful shutdown...");
        self.scheduler.stop_all();

        if tokio::time::timeout(drain, self.queue.wait_idle()).await.is_err() {
            warn!(
                "[order-sync] Drain timed out after {:?}, {} jobs abandoned",
                drain,
                self.queue.len()
            );
        }

        let _ = self.shutdown_tx.send(true);
        if let Some(mut worker) = self.worker.lock().take() {
            let abandoned = worker.discard_pending();
            if abandoned > 0 {
                warn!("[order-sync] Worker never started, {} jobs dropped", abandoned);
            }
        }
        let handle = self.worker_task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("[order-sync] Worker task ended abnormally: {}", e);
            }
        }
        info!("[order-sync] Shutdown complete");
    }

    pub fn orchestrator(&self) -> Arc<SyncOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn worker_running(&self) -> bool {
        self.worker_task
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

/// RFC 3339 rendering with millisecond precision and a `Z` suffix.
pub fn format_timestamp(millis: Timestamp) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn order_view(order: &SourceOrder, record: Option<&SyncRecord>) -> OrderView {
    OrderView {
        source_order_id: order.source_order_id.clone(),
        customer: order.customer().to_string(),
        status: record.map_or(OrderStatus::PendingPull, |r| r.state.into()),
        destination_id: record.and_then(|r| r.destination_id.clone()),
        last_error: record.and_then(|r| r.last_error.clone()),
        retry_count: record.map_or(0, |r| r.retry_count),
    }
}

impl OrderSyncApi for OrderSyncService {
    fn enqueue_fetch(&self) -> Result<(), SyncError> {
        self.queue.enqueue(JobKind::FetchOrders).map(|_| ())
    }

    fn enqueue_sync(&self, order: SourceOrder) -> Result<(), SyncError> {
        order.validate()?;
        self.queue.enqueue(JobKind::SyncOrder(order)).map(|_| ())
    }

    fn list_orders(&self) -> Vec<OrderView> {
        let snapshot = self.store.snapshot();
        let records: HashMap<&str, &SyncRecord> = snapshot
            .sync_records
            .iter()
            .map(|r| (r.source_order_id.as_str(), r))
            .collect();
        let source_ids: HashSet<&str> = snapshot
            .source_orders
            .iter()
            .map(|o| o.source_order_id.as_str())
            .collect();

        // Source orders first, then records synced without a stored source order
        let untracked = snapshot
            .sync_records
            .iter()
            .filter(|r| !source_ids.contains(r.source_order_id.as_str()))
            .map(|r| order_view(&r.source_payload, Some(r)));

        snapshot
            .source_orders
            .iter()
            .map(|order| order_view(order, records.get(order.source_order_id.as_str()).copied()))
            .chain(untracked)
            .collect()
    }

    fn list_dead_letters(&self) -> Vec<DeadLetterView> {
        self.store
            .list_sync_records()
            .into_iter()
            .filter(|r| r.state == SyncState::DeadLetter)
            .map(|r| DeadLetterView {
                created_at: format_timestamp(r.created_at),
                last_error: r.last_error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                id: r.sync_id,
                source_order_id: r.source_order_id,
                retry_count: r.retry_count,
            })
            .collect()
    }

    fn replay(&self, sync_id: &str) -> bool {
        match self.orchestrator.replay(sync_id) {
            Ok(()) => true,
            Err(e) => {
                debug!("[order-sync] Replay of {} refused: {}", sync_id, e);
                false
            }
        }
    }

    fn summary(&self) -> ReconciliationSummary {
        self.reconciliation.summary()
    }

    fn detailed_report(&self) -> Vec<Discrepancy> {
        self.reconciliation.detailed_report()
    }

    fn reconcile_now(&self) -> ReconciliationSummary {
        self.reconciliation.run_check()
    }

    fn queue_length(&self) -> usize {
        self.queue.len()
    }

    fn is_sync_enabled(&self) -> bool {
        self.scheduler.is_sync_enabled()
    }

    fn is_reconcile_enabled(&self) -> bool {
        self.scheduler.is_reconcile_enabled()
    }

    fn start_sync(&self) {
        self.scheduler.start_sync();
    }

    fn stop_sync(&self) {
        self.scheduler.stop_sync();
    }

    fn start_reconcile(&self) {
        self.scheduler.start_reconcile();
    }

    fn stop_reconcile(&self) {
        self.scheduler.stop_reconcile();
    }

    fn system_health(&self) -> SystemHealth {
        let summary = self.reconciliation.summary();
        let queue_status = if self.worker_running() {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        };

        SystemHealth {
            erp: ComponentStatus::Up,
            wms: ComponentStatus::Up,
            queue: QueueHealth {
                status: queue_status,
                length: self.queue.len(),
            },
            jobs: JobsHealth {
                sync: self.scheduler.is_sync_enabled(),
                reconcile: self.scheduler.is_reconcile_enabled(),
            },
            is_healthy: summary.mismatches <= self.config.health_mismatch_threshold,
        }
    }

    fn debug_source_orders(&self) -> Vec<SourceOrder> {
        self.store.list_source_orders()
    }

    fn debug_destination_orders(&self) -> Vec<DestinationOrder> {
        self.store.list_destination_orders()
    }

    #[cfg(feature = "scenarios")]
    fn inject_source_order(
        &self,
        mut order: SourceOrder,
        scenario: Option<Scenario>,
    ) -> Result<String, SyncError> {
        let scenario = scenario.unwrap_or_default();
        order.validate()?;
        order.source_order_id = scenario.tag(&order.source_order_id);
        let id = order.source_order_id.clone();

        if scenario == Scenario::Duplicate {
            self.store.put_source_order(order.clone())?;
        }
        self.store.put_source_order(order)?;

        info!("[erp] Injected order {} (scenario: {:?})", id, scenario);
        Ok(id)
    }
}
