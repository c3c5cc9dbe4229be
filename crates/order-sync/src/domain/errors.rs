//! Order-sync error types.

use thiserror::Error;

use super::entities::SyncState;

/// Errors raised inside the order-sync pipeline.
///
/// Destination failures are never surfaced to callers of `enqueue_sync`; the
/// orchestrator folds them into the sync record. The variants here exist so
/// that adapters, the store and the queue can report what went wrong.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum SyncError {
    /// Incoming source order failed structural validation.
    #[error("invalid source order: {0}")]
    InvalidOrder(String),

    /// Upstream system could not be read.
    #[error("source system error: {0}")]
    Source(String),

    /// Downstream submission failed (transport or processing).
    #[error("{0}")]
    Destination(String),

    /// Downstream submission exceeded the configured timeout.
    #[error("destination did not respond within {timeout_ms}ms")]
    DestinationTimeout { timeout_ms: u64 },

    /// No sync record with that id.
    #[error("sync record not found: {0}")]
    RecordNotFound(String),

    /// Replay requested for a record outside `DEAD_LETTER`.
    #[error("sync record {sync_id} is {state}, only DEAD_LETTER can be replayed")]
    NotReplayable { sync_id: String, state: SyncState },

    /// The worker has stopped and no longer accepts jobs.
    #[error("job queue is closed")]
    QueueClosed,

    /// A job handler panicked; the job was dropped.
    #[error("job {job_id} panicked: {message}")]
    JobPanicked { job_id: String, message: String },

    /// Record store rejected a write.
    #[error("record store error: {0}")]
    Store(String),
}

impl SyncError {
    /// Failure reason as recorded in `SyncRecord::last_error`.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Whether the error happened while talking to the destination system.
    pub fn is_destination_failure(&self) -> bool {
        matches!(self, Self::Destination(_) | Self::DestinationTimeout { .. })
    }
}
