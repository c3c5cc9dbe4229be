//! Interval timers for fetch sweeps and reconciliation checks.
//!
//! Each timer is a Tokio task; the task handle doubles as the "enabled" flag.
//! Starting a running timer is a no-op; stopping aborts the task so no
//! periodic work outlives `stop_*` or the scheduler itself.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::{JobQueue, ReconciliationEngine};
use crate::domain::JobKind;

/// Owner of the sync and reconcile timers.
pub struct Scheduler {
    queue: JobQueue,
    reconciliation: Arc<ReconciliationEngine>,
    sync_interval: Duration,
    reconcile_interval: Duration,
    sync_task: Mutex<Option<JoinHandle<()>>>,
    reconcile_task: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        queue: JobQueue,
        reconciliation: Arc<ReconciliationEngine>,
        sync_interval: Duration,
        reconcile_interval: Duration,
    ) -> Self {
        Self {
            queue,
            reconciliation,
            sync_interval: sync_interval.max(Duration::from_millis(1)),
            reconcile_interval: reconcile_interval.max(Duration::from_millis(1)),
            sync_task: Mutex::new(None),
            reconcile_task: Mutex::new(None),
        }
    }

    /// Enqueue a fetch now, then one per interval.
    pub fn start_sync(&self) {
        let mut slot = self.sync_task.lock();
        if is_running(&slot) {
            return;
        }

        if let Err(e) = self.queue.enqueue(JobKind::FetchOrders) {
            warn!("[scheduler] Background sync not started: {}", e);
            *slot = None;
            return;
        }
        info!("[scheduler] Starting background sync every {:?}", self.sync_interval);

        let queue = self.queue.clone();
        let period = self.sync_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = queue.enqueue(JobKind::FetchOrders) {
                    warn!("[scheduler] Fetch not queued, stopping sync timer: {}", e);
                    break;
                }
            }
        }));
    }

    pub fn stop_sync(&self) {
        if let Some(handle) = self.sync_task.lock().take() {
            handle.abort();
            info!("[scheduler] Stopped background sync");
        }
    }

    /// Run a reconciliation check every interval. Observes only.
    pub fn start_reconcile(&self) {
        let mut slot = self.reconcile_task.lock();
        if is_running(&slot) {
            return;
        }
        info!(
            "[scheduler] Starting background reconciliation every {:?}",
            self.reconcile_interval
        );

        let engine = Arc::clone(&self.reconciliation);
        let period = self.reconcile_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                engine.run_check();
            }
        }));
    }

    pub fn stop_reconcile(&self) {
        if let Some(handle) = self.reconcile_task.lock().take() {
            handle.abort();
            info!("[scheduler] Stopped background reconciliation");
        }
    }

    /// True while the sync timer task is alive. The task ends on its own
    /// once the queue closes.
    pub fn is_sync_enabled(&self) -> bool {
        is_running(&self.sync_task.lock())
    }

    pub fn is_reconcile_enabled(&self) -> bool {
        is_running(&self.reconcile_task.lock())
    }

    pub fn stop_all(&self) {
        self.stop_sync();
        self.stop_reconcile();
    }
}

fn is_running(slot: &Option<JoinHandle<()>>) -> bool {
    slot.as_ref().is_some_and(|h| !h.is_finished())
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}
