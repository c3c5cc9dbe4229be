//! Sync orchestrator: owns the per-order state machine.
//!
//! Only ever driven from the queue worker (plus `replay`, which touches
//! dead-lettered records the worker never mutates), so there is a single
//! writer for sync records and no locking here.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sync_telemetry::{
    log_order_event, metric_inc, time_histogram, REPLAYS, SUBMIT_DURATION, SYNC_ATTEMPTS,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::queue::JobHandler;
use super::JobQueue;
use crate::algorithms::to_submission;
use crate::config::SyncConfig;
use crate::domain::{
    invariant_acknowledged_has_destination, invariant_retry_bounded, Job, JobKind,
    OrderSubmission, SourceOrder, SubmitOutcome, SweepReport, SyncError, SyncRecord, SyncState,
};
use crate::ports::{DestinationSystem, RecordStore, SourceSystem, TimeSource};

/// Drives source orders through `PENDING_SYNC → ACKNOWLEDGED_BY_WMS | FAILED
/// | DEAD_LETTER`.
pub struct SyncOrchestrator {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn SourceSystem>,
    destination: Arc<dyn DestinationSystem>,
    queue: JobQueue,
    time: Arc<dyn TimeSource>,
    max_attempts: u32,
    submit_timeout: Option<Duration>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn SourceSystem>,
        destination: Arc<dyn DestinationSystem>,
        queue: JobQueue,
        time: Arc<dyn TimeSource>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            source,
            destination,
            queue,
            time,
            max_attempts: config.max_attempts,
            submit_timeout: config.submit_timeout(),
        }
    }

    /// Fetch sweep.
    ///
    /// Enqueues a sync job for every source order not yet tracked, then
    /// re-enqueues every `PENDING_SYNC`/`FAILED` record still under the
    /// attempt limit, using its retained payload. No backoff: a record is
    /// retried once per sweep.
    pub async fn fetch_and_enqueue_orders(&self) -> Result<SweepReport, SyncError> {
        info!("[orchestrator] Starting fetch job ({})", self.source.system_id());

        let new_orders = self.source.fetch_new_orders().await?;
        let mut report = SweepReport {
            new_orders: new_orders.len(),
            retried: 0,
        };
        for order in new_orders {
            self.queue.enqueue(JobKind::SyncOrder(order))?;
        }

        let candidates: Vec<SyncRecord> = self
            .store
            .list_sync_records()
            .into_iter()
            .filter(|r| r.is_retry_candidate(self.max_attempts))
            .collect();
        report.retried = candidates.len();
        for record in candidates {
            self.queue.enqueue(JobKind::SyncOrder(record.source_payload))?;
        }

        info!(
            "[orchestrator] Found {} new orders, retrying {} pending/failed",
            report.new_orders, report.retried
        );
        Ok(report)
    }

    /// Process one source order and return the record's resulting state.
    ///
    /// Reuses the existing record for this source order if there is one.
    /// Records in a terminal state are left alone. Destination failures are
    /// folded into the record; only store errors propagate.
    pub async fn process_order(&self, order: SourceOrder) -> Result<SyncState, SyncError> {
        let mut record = match self.store.find_sync_record_by_source_id(&order.source_order_id) {
            Some(existing) => existing,
            None => {
                let record =
                    SyncRecord::new(Uuid::new_v4().to_string(), order.clone(), self.time.now());
                self.store.put_sync_record(record.clone())?;
                log_order_event!(debug, "orchestrator", "Sync record created", record.source_order_id,
                    sync_id = %record.sync_id);
                record
            }
        };

        if record.is_terminal() {
            debug!(
                "[orchestrator] Skipping {} already in {}",
                record.source_order_id, record.state
            );
            return Ok(record.state);
        }

        let outcome = self.submit(to_submission(&order)).await;
        let now = self.time.now();

        match outcome {
            Ok(SubmitOutcome::Accepted { destination_id }) => {
                record.acknowledge(destination_id, now);
                metric_inc!(SYNC_ATTEMPTS, &["acknowledged"]);
                log_order_event!(info, "orchestrator", "Order acknowledged by destination",
                    record.source_order_id,
                    sync_id = %record.sync_id,
                    destination_id = ?record.destination_id);
            }
            Ok(SubmitOutcome::Rejected { reason }) => self.record_failure(&mut record, &reason, now),
            Err(e) => self.record_failure(&mut record, &e.reason(), now),
        }

        debug_assert!(invariant_retry_bounded(&record, self.max_attempts));
        debug_assert!(invariant_acknowledged_has_destination(&record));

        let state = record.state;
        self.store.put_sync_record(record)?;
        Ok(state)
    }

    fn record_failure(&self, record: &mut SyncRecord, reason: &str, now: u64) {
        match record.record_failure(reason, self.max_attempts, now) {
            SyncState::DeadLetter => {
                metric_inc!(SYNC_ATTEMPTS, &["dead_letter"]);
                log_order_event!(error, "orchestrator", "Retries exhausted, moved to dead letter",
                    record.source_order_id,
                    sync_id = %record.sync_id,
                    retry_count = record.retry_count,
                    reason = reason);
            }
            _ => {
                metric_inc!(SYNC_ATTEMPTS, &["failed"]);
                log_order_event!(warn, "orchestrator", "Submission failed",
                    record.source_order_id,
                    sync_id = %record.sync_id,
                    retry_count = record.retry_count,
                    reason = reason);
            }
        }
    }

    /// Call the destination, bounded by the configured timeout.
    async fn submit(&self, submission: OrderSubmission) -> Result<SubmitOutcome, SyncError> {
        let _timer = time_histogram!(SUBMIT_DURATION);
        match self.submit_timeout {
            Some(limit) => tokio::time::timeout(limit, self.destination.submit_order(submission))
                .await
                .unwrap_or_else(|_| Err(timeout_error(limit))),
            None => self.destination.submit_order(submission).await,
        }
    }

    /// Revive a dead-lettered record and queue it again with its original
    /// payload.
    ///
    /// # Errors
    /// - `RecordNotFound` for unknown ids
    /// - `NotReplayable` for records outside `DEAD_LETTER` (nothing changes)
    /// - `QueueClosed` if the worker is gone (the reset is kept; the next
    ///   sweep will pick the record up)
    pub fn replay(&self, sync_id: &str) -> Result<(), SyncError> {
        let mut record = self
            .store
            .get_sync_record(sync_id)
            .ok_or_else(|| SyncError::RecordNotFound(sync_id.to_string()))?;

        record.reset_for_replay(self.time.now())?;
        let payload = record.source_payload.clone();
        self.store.put_sync_record(record)?;

        metric_inc!(REPLAYS);
        log_order_event!(info, "orchestrator", "Replaying dead-lettered order",
            payload.source_order_id, sync_id = sync_id);

        self.queue.enqueue(JobKind::SyncOrder(payload))?;
        Ok(())
    }
}

#[async_trait]
impl JobHandler for SyncOrchestrator {
    async fn handle(&self, job: Job) -> Result<(), SyncError> {
        match job.kind {
            JobKind::FetchOrders => self.fetch_and_enqueue_orders().await.map(|_| ()),
            JobKind::SyncOrder(order) => self.process_order(order).await.map(|_| ()),
        }
    }
}

/// Timeout error with the limit saturated to whole milliseconds.
fn timeout_error(limit: Duration) -> SyncError {
    SyncError::DestinationTimeout {
        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }
}
