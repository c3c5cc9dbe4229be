//! Value objects: jobs, submission payloads, and the read models exposed to
//! the API layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entities::{
    DestinationOrder, DestinationStatus, IssueStatus, SourceOrder, SyncRecord, SyncState,
};

// =============================================================================
// SUBMISSION
// =============================================================================

/// Line item as shaped for the destination system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationItem {
    pub sku: String,
    pub quantity: u32,
    /// Originating source line id, kept for traceability.
    pub source_line_id: u64,
}

/// Destination-shaped payload produced by the transform step.
///
/// The destination assigns the id; everything else is decided upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub platform_order_id: Option<String>,
    /// Join key back to `SourceOrder::source_order_id`.
    pub shop_ref: String,
    pub status: DestinationStatus,
    pub country_code: Option<String>,
    pub issue_status: IssueStatus,
    pub is_manual_hold: bool,
    pub items: Vec<DestinationItem>,
}

/// Result of a destination submission that reached the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Order created, or already present under this `shop_ref`.
    Accepted { destination_id: String },
    /// Destination processed the request and refused it.
    Rejected { reason: String },
}

// =============================================================================
// JOBS
// =============================================================================

/// Work item kinds. Matched exhaustively by the queue handler.
#[derive(Clone, Debug, PartialEq)]
pub enum JobKind {
    /// Pull new source orders and sweep retry candidates.
    FetchOrders,
    /// Push one source order through the state machine.
    SyncOrder(SourceOrder),
}

impl JobKind {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchOrders => "FETCH_ORDERS",
            Self::SyncOrder(_) => "SYNC_ORDER",
        }
    }
}

/// Transient unit of work. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    /// Carried for observability; the queue itself never retries.
    pub retry_count: u32,
}

impl Job {
    pub fn new(kind: JobKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            retry_count: 0,
        }
    }
}

/// What one fetch sweep enqueued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Source orders with no sync record yet.
    pub new_orders: usize,
    /// `PENDING_SYNC`/`FAILED` records re-enqueued.
    pub retried: usize,
}

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Scalar reconciliation summary.
///
/// `in_sync + status_mismatch + failed + only_in_erp` always equals the
/// number of source orders in the snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    pub in_sync: usize,
    pub only_in_erp: usize,
    pub only_in_wms: usize,
    pub status_mismatch: usize,
    pub failed: usize,
    /// `failed + status_mismatch + only_in_wms`.
    pub mismatches: usize,
}

/// Category of an itemized reconciliation finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscrepancyKind {
    #[serde(rename = "Missing in WMS")]
    MissingInDestination,
    #[serde(rename = "Sync Failed")]
    SyncFailed,
    #[serde(rename = "Orphan in WMS")]
    OrphanInDestination,
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingInDestination => "Missing in WMS",
            Self::SyncFailed => "Sync Failed",
            Self::OrphanInDestination => "Orphan in WMS",
        })
    }
}

/// One itemized reconciliation finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    /// For orphans this is the destination's `shop_ref`.
    pub source_order_id: String,
    pub issue: DiscrepancyKind,
    pub details: Option<String>,
}

/// Consistent point-in-time copy of all three record sets, in store order.
#[derive(Clone, Debug, Default)]
pub struct StoreSnapshot {
    pub source_orders: Vec<SourceOrder>,
    pub destination_orders: Vec<DestinationOrder>,
    pub sync_records: Vec<SyncRecord>,
}

// =============================================================================
// READ MODELS
// =============================================================================

/// Status shown in order listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Source order exists but no sync record has been created yet.
    PendingPull,
    PendingSync,
    AcknowledgedByWms,
    Failed,
    DeadLetter,
}

impl From<SyncState> for OrderStatus {
    fn from(state: SyncState) -> Self {
        match state {
            SyncState::PendingSync => Self::PendingSync,
            SyncState::AcknowledgedByWms => Self::AcknowledgedByWms,
            SyncState::Failed => Self::Failed,
            SyncState::DeadLetter => Self::DeadLetter,
        }
    }
}

/// One row of `list_orders`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub source_order_id: String,
    pub customer: String,
    pub status: OrderStatus,
    pub destination_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub retry_count: u32,
}

/// One row of `list_dead_letters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterView {
    /// The sync id; pass this to `replay`.
    pub id: String,
    pub source_order_id: String,
    pub last_error: String,
    pub retry_count: u32,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// Reachability of a component in the health report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueHealth {
    pub status: ComponentStatus,
    pub length: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsHealth {
    pub sync: bool,
    pub reconcile: bool,
}

/// Aggregated health view for the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub erp: ComponentStatus,
    pub wms: ComponentStatus,
    pub queue: QueueHealth,
    pub jobs: JobsHealth,
    /// False once reconciliation mismatches exceed the configured threshold.
    pub is_healthy: bool,
}

// =============================================================================
// DEMO SCENARIOS
// =============================================================================

/// Marker that makes the simulated destination fail about half the time.
#[cfg(feature = "scenarios")]
pub const FAIL_RANDOM_MARKER: &str = "FAIL_RANDOM";

/// Marker that makes the simulated destination always fail.
#[cfg(feature = "scenarios")]
pub const FAIL_HARD_MARKER: &str = "FAIL_HARD";

/// Injection scenario for the demo/test hook.
#[cfg(feature = "scenarios")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scenario {
    #[default]
    Normal,
    FailRandom,
    FailHard,
    /// Inject the same order twice.
    Duplicate,
}

#[cfg(feature = "scenarios")]
impl Scenario {
    /// Effective source order id after tagging.
    pub fn tag(&self, source_order_id: &str) -> String {
        match self {
            Self::FailRandom => format!("{FAIL_RANDOM_MARKER}-{source_order_id}"),
            Self::FailHard => format!("{FAIL_HARD_MARKER}-{source_order_id}"),
            Self::Normal | Self::Duplicate => source_order_id.to_string(),
        }
    }
}
