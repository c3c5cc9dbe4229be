//! # Outbound Ports
//!
//! Traits for the pipeline's dependencies: the record store, the two external
//! systems, and the clock.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::{
    DestinationOrder, OrderSubmission, SourceOrder, StoreSnapshot, SubmitOutcome, SyncError,
    SyncRecord, Timestamp,
};

/// Record store - outbound port.
///
/// Owns the three record sets. Writes replace by primary key. Reads return
/// owned copies, so a reader never observes a partially written record.
/// `list_*` and `snapshot` return records in insertion order.
pub trait RecordStore: Send + Sync {
    /// Insert or replace a source order keyed by `source_order_id`.
    fn put_source_order(&self, order: SourceOrder) -> Result<(), SyncError>;

    fn get_source_order(&self, source_order_id: &str) -> Option<SourceOrder>;

    fn list_source_orders(&self) -> Vec<SourceOrder>;

    /// Insert or replace a destination order keyed by its id.
    fn put_destination_order(&self, order: DestinationOrder) -> Result<(), SyncError>;

    fn get_destination_order(&self, id: &str) -> Option<DestinationOrder>;

    /// Indexed lookup by the cross-system join key.
    fn find_destination_by_shop_ref(&self, shop_ref: &str) -> Option<DestinationOrder>;

    fn list_destination_orders(&self) -> Vec<DestinationOrder>;

    /// Insert or replace a sync record keyed by `sync_id`.
    ///
    /// # Errors
    /// `Store` if a different record already tracks the same source order.
    fn put_sync_record(&self, record: SyncRecord) -> Result<(), SyncError>;

    fn get_sync_record(&self, sync_id: &str) -> Option<SyncRecord>;

    /// Indexed lookup of the single record tracking a source order.
    fn find_sync_record_by_source_id(&self, source_order_id: &str) -> Option<SyncRecord>;

    fn list_sync_records(&self) -> Vec<SyncRecord>;

    /// Copy of all three record sets taken under one read.
    fn snapshot(&self) -> StoreSnapshot;
}

/// Upstream order system - outbound port.
#[async_trait]
pub trait SourceSystem: Send + Sync {
    /// Source orders not yet known to any sync record.
    async fn fetch_new_orders(&self) -> Result<Vec<SourceOrder>, SyncError>;

    /// Identifier for logging.
    fn system_id(&self) -> &str;
}

/// Downstream fulfillment system - outbound port.
///
/// Implementations must be idempotent by `shop_ref`: resubmitting an order
/// that already exists downstream returns `Accepted` with the existing id.
#[async_trait]
pub trait DestinationSystem: Send + Sync {
    /// Submit one order.
    ///
    /// `Ok(Rejected)` means the destination refused it; `Err` means the call
    /// itself failed. The orchestrator treats both as a failed attempt.
    async fn submit_order(&self, submission: OrderSubmission) -> Result<SubmitOutcome, SyncError>;

    /// Identifier for logging.
    fn system_id(&self) -> &str;
}

/// Abstract interface for time.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since UNIX epoch.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    now: AtomicU64,
}

impl MockTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// How a `ScriptedDestination` answers once its scripted failures run out.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ScriptedMode {
    /// Accept (idempotently by `shop_ref`).
    #[default]
    Accept,
    /// Return `Rejected` with this reason.
    Reject(String),
    /// Return `Err(Destination)` with this message.
    Error(String),
}

/// Scripted destination for testing.
///
/// Fails the first `fail_first` calls with `Rejected`, then answers per
/// `mode`. Accepted ids are `mock-<shop_ref>`.
#[derive(Debug, Default)]
pub struct ScriptedDestination {
    /// Remaining scripted rejections.
    pub fail_first: AtomicU32,
    /// Behaviour after scripted rejections are used up.
    pub mode: Mutex<ScriptedMode>,
    /// Delay before answering, for timeout tests.
    pub delay: Option<Duration>,
    calls: AtomicU32,
    accepted: Mutex<HashMap<String, String>>,
}

impl ScriptedDestination {
    /// Accepts everything.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Rejects the first `n` submissions, then accepts.
    pub fn failing_first(n: u32) -> Self {
        Self {
            fail_first: AtomicU32::new(n),
            ..Self::default()
        }
    }

    /// Rejects every submission.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            mode: Mutex::new(ScriptedMode::Reject(reason.to_string())),
            ..Self::default()
        }
    }

    /// Accepts everything after sleeping for `delay`.
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Errors on every submission.
    pub fn erroring(message: &str) -> Self {
        Self {
            mode: Mutex::new(ScriptedMode::Error(message.to_string())),
            ..Self::default()
        }
    }

    pub fn set_mode(&self, mode: ScriptedMode) {
        *self.mode.lock() = mode;
    }

    /// Number of `submit_order` calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Distinct orders accepted so far.
    pub fn accepted_count(&self) -> usize {
        self.accepted.lock().len()
    }
}

#[async_trait]
impl DestinationSystem for ScriptedDestination {
    async fn submit_order(&self, submission: OrderSubmission) -> Result<SubmitOutcome, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if scripted {
            return Ok(SubmitOutcome::Rejected {
                reason: "Scripted failure".to_string(),
            });
        }

        let mode = self.mode.lock().clone();
        match mode {
            ScriptedMode::Accept => {
                let destination_id = self
                    .accepted
                    .lock()
                    .entry(submission.shop_ref.clone())
                    .or_insert_with(|| format!("mock-{}", submission.shop_ref))
                    .clone();
                Ok(SubmitOutcome::Accepted { destination_id })
            }
            ScriptedMode::Reject(reason) => Ok(SubmitOutcome::Rejected { reason }),
            ScriptedMode::Error(message) => Err(SyncError::Destination(message)),
        }
    }

    fn system_id(&self) -> &str {
        "scripted-destination"
    }
}
