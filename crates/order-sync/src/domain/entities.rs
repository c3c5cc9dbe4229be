//! Core domain entities for the order-sync pipeline.
//!
//! Three record sets live in the store:
//! - `SourceOrder`: immutable snapshot pulled from the upstream system (ERP)
//! - `DestinationOrder`: downstream-shaped record created by the WMS
//! - `SyncRecord`: the pipeline's own bookkeeping, one per source order

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SyncError;
use super::invariants::DEAD_LETTER_PREFIX;
use super::value_objects::{DestinationItem, OrderSubmission};

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

// =============================================================================
// SOURCE (ERP) SIDE
// =============================================================================

/// Delivery address of a source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    /// Recipient name, shown as the customer in order listings.
    pub name: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    pub city: String,
    pub zip: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    #[serde(default)]
    pub subdivision_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Product reference on a line item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: u64,
    pub name: String,
    /// Product code, used as the SKU downstream.
    pub code: String,
    #[serde(default)]
    pub hs_code: Option<String>,
}

/// Component of a bundled line item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubline {
    pub id: u64,
    pub product: ProductRef,
    pub quantity: u32,
}

/// A single order line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: u64,
    pub product: ProductRef,
    pub quantity: u32,
    /// ISO 4217 currency of `unit_customs_value`.
    pub currency: String,
    pub unit_customs_value: f64,
    #[serde(default)]
    pub sublines: Vec<OrderSubline>,
}

/// An order as known by the upstream system of record.
///
/// Never mutated once pulled; retained verbatim on the `SyncRecord` so that
/// retries and replays do not need to re-fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOrder {
    /// Unique upstream identifier; the join key to `DestinationOrder::shop_ref`.
    pub source_order_id: String,
    pub organization_id: String,
    pub channel_id: String,
    pub delivery_address: DeliveryAddress,
    pub lines: Vec<OrderLine>,
}

impl SourceOrder {
    /// Customer name as displayed in order listings.
    pub fn customer(&self) -> &str {
        &self.delivery_address.name
    }

    /// Validates the structural requirements of an incoming order.
    ///
    /// # Errors
    /// - `InvalidOrder` if the id is blank, there are no lines, or any line
    ///   has a zero quantity
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.source_order_id.trim().is_empty() {
            return Err(SyncError::InvalidOrder("sourceOrderId is empty".to_string()));
        }
        if self.lines.is_empty() {
            return Err(SyncError::InvalidOrder(format!(
                "order {} has no line items",
                self.source_order_id
            )));
        }
        if let Some(line) = self.lines.iter().find(|l| l.quantity == 0) {
            return Err(SyncError::InvalidOrder(format!(
                "order {} line {} has zero quantity",
                self.source_order_id, line.id
            )));
        }
        Ok(())
    }
}

// =============================================================================
// DESTINATION (WMS) SIDE
// =============================================================================

/// Fulfillment status reported by the destination system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationStatus {
    #[default]
    Paid,
    Shipped,
    Cancelled,
}

/// Issue flag on a destination order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[default]
    NoIssue,
    Unresolved,
    Resolved,
}

/// The downstream-shaped representation of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationOrder {
    /// Identifier generated by the destination system.
    pub id: String,
    pub platform_order_id: Option<String>,
    /// Originating `source_order_id`.
    pub shop_ref: String,
    pub created_at: Timestamp,
    pub status: DestinationStatus,
    pub country_code: Option<String>,
    pub issue_status: IssueStatus,
    pub is_manual_hold: bool,
    pub items: Vec<DestinationItem>,
}

impl DestinationOrder {
    /// Materializes an accepted submission under a destination-assigned id.
    pub fn from_submission(id: String, submission: OrderSubmission, created_at: Timestamp) -> Self {
        Self {
            id,
            platform_order_id: submission.platform_order_id,
            shop_ref: submission.shop_ref,
            created_at,
            status: submission.status,
            country_code: submission.country_code,
            issue_status: submission.issue_status,
            is_manual_hold: submission.is_manual_hold,
            items: submission.items,
        }
    }
}

// =============================================================================
// SYNC BOOKKEEPING
// =============================================================================

/// Per-order sync state.
///
/// ```text
/// [PENDING_SYNC] ──ok──→ [ACKNOWLEDGED_BY_WMS]
///      │  ↑
///      │  └──────── replay ─────────┐
///      ↓                            │
///   [FAILED] ──3rd failure──→ [DEAD_LETTER]
///      │ ↺ (retry sweep)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    /// Known to the pipeline, not yet submitted (or reset by replay).
    #[default]
    PendingSync,
    /// Destination accepted the order. Terminal.
    AcknowledgedByWms,
    /// Last submission failed; eligible for retry.
    Failed,
    /// Retries exhausted. Terminal until replayed.
    DeadLetter,
}

impl SyncState {
    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingSync => "PENDING_SYNC",
            Self::AcknowledgedByWms => "ACKNOWLEDGED_BY_WMS",
            Self::Failed => "FAILED",
            Self::DeadLetter => "DEAD_LETTER",
        }
    }

    /// Processing a record in a terminal state is a no-op.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AcknowledgedByWms | Self::DeadLetter)
    }

    /// States the retry sweep picks up.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PendingSync | Self::Failed)
    }

    /// States the reconciliation engine counts as failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::DeadLetter)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping entity tracking one source order's journey to the destination.
///
/// INVARIANT: at most one record per `source_order_id` (enforced by the store).
/// INVARIANT: `retry_count` only grows, except on `reset_for_replay`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub sync_id: String,
    pub source_order_id: String,
    pub state: SyncState,
    pub destination_id: Option<String>,
    pub last_error: Option<String>,
    pub retry_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Original payload, kept for retry and replay.
    pub source_payload: SourceOrder,
}

impl SyncRecord {
    /// Creates a fresh `PENDING_SYNC` record for a newly seen source order.
    pub fn new(sync_id: String, order: SourceOrder, now: Timestamp) -> Self {
        Self {
            sync_id,
            source_order_id: order.source_order_id.clone(),
            state: SyncState::PendingSync,
            destination_id: None,
            last_error: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
            source_payload: order,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// True if the retry sweep should re-enqueue this record.
    pub fn is_retry_candidate(&self, max_attempts: u32) -> bool {
        self.state.is_retryable() && self.retry_count < max_attempts
    }

    /// Records a successful submission.
    pub fn acknowledge(&mut self, destination_id: String, now: Timestamp) {
        self.state = SyncState::AcknowledgedByWms;
        self.destination_id = Some(destination_id);
        self.last_error = None;
        self.updated_at = now;
    }

    /// Records a failed submission and returns the resulting state.
    ///
    /// The attempt counter is bumped first; reaching `max_attempts` moves the
    /// record to `DEAD_LETTER` with the reason prefixed.
    pub fn record_failure(&mut self, reason: &str, max_attempts: u32, now: Timestamp) -> SyncState {
        self.retry_count = self.retry_count.saturating_add(1);
        if self.retry_count >= max_attempts {
            self.state = SyncState::DeadLetter;
            self.last_error = Some(format!("{DEAD_LETTER_PREFIX}{reason}"));
        } else {
            self.state = SyncState::Failed;
            self.last_error = Some(reason.to_string());
        }
        self.updated_at = now;
        self.state
    }

    /// Revives a dead-lettered record.
    ///
    /// # Errors
    /// Returns `NotReplayable` if the record is not in `DEAD_LETTER`; the
    /// record is left untouched in that case.
    pub fn reset_for_replay(&mut self, now: Timestamp) -> Result<(), SyncError> {
        if self.state != SyncState::DeadLetter {
            return Err(SyncError::NotReplayable {
                sync_id: self.sync_id.clone(),
                state: self.state,
            });
        }
        self.state = SyncState::PendingSync;
        self.retry_count = 0;
        self.last_error = None;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal valid source order used across unit tests.
    pub fn source_order(id: &str) -> SourceOrder {
        SourceOrder {
            source_order_id: id.to_string(),
            organization_id: "org-1".to_string(),
            channel_id: "web".to_string(),
            delivery_address: DeliveryAddress {
                name: format!("Customer {id}"),
                address1: "1 Main St".to_string(),
                address2: None,
                business_name: None,
                city: "Springfield".to_string(),
                zip: "12345".to_string(),
                country_code: "US".to_string(),
                subdivision_code: None,
                phone: None,
            },
            lines: vec![OrderLine {
                id: 1,
                product: ProductRef {
                    id: 100,
                    name: "Widget".to_string(),
                    code: "WGT-100".to_string(),
                    hs_code: None,
                },
                quantity: 2,
                currency: "USD".to_string(),
                unit_customs_value: 9.5,
                sublines: Vec::new(),
            }],
        }
    }
}
