//! Domain invariants for the order-sync pipeline.
//!
//! Each check is a pure predicate over a store snapshot; they back
//! `debug_assert!`s in the orchestrator and the property tests.

use std::collections::HashSet;

use super::entities::{SyncRecord, SyncState};
use super::value_objects::StoreSnapshot;

/// Cumulative failed attempts before a record is dead-lettered.
pub const MAX_SYNC_ATTEMPTS: u32 = 3;

/// Prefix applied to `last_error` when a record is dead-lettered.
pub const DEAD_LETTER_PREFIX: &str = "Max retries reached. Last error: ";

/// `last_error` shown for dead letters that somehow carry none.
pub const UNKNOWN_ERROR: &str = "Unknown";

/// Details for a missing-in-destination order that was never picked up.
pub const NO_SYNC_RECORD: &str = "No sync record found";

/// INVARIANT-1: One Record Per Order
/// No two sync records share a `source_order_id`.
pub fn invariant_unique_source_ids(records: &[SyncRecord]) -> bool {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().all(|r| seen.insert(r.source_order_id.as_str()))
}

/// INVARIANT-2: Bounded Attempts
/// Only a dead-lettered record may have reached the attempt limit.
pub fn invariant_retry_bounded(record: &SyncRecord, max_attempts: u32) -> bool {
    match record.state {
        SyncState::DeadLetter => record.retry_count >= max_attempts,
        SyncState::Failed => record.retry_count > 0 && record.retry_count < max_attempts,
        SyncState::PendingSync | SyncState::AcknowledgedByWms => record.retry_count < max_attempts,
    }
}

/// INVARIANT-3: Acknowledged Means Linked
/// An acknowledged record always carries the destination id it was given.
pub fn invariant_acknowledged_has_destination(record: &SyncRecord) -> bool {
    record.state != SyncState::AcknowledgedByWms || record.destination_id.is_some()
}

/// INVARIANT-4: Destination Uniqueness
/// At most one destination order per `shop_ref`.
pub fn invariant_unique_shop_refs(snapshot: &StoreSnapshot) -> bool {
    let mut seen = HashSet::with_capacity(snapshot.destination_orders.len());
    snapshot
        .destination_orders
        .iter()
        .all(|d| seen.insert(d.shop_ref.as_str()))
}

/// Check all invariants over a snapshot.
pub fn check_all_invariants(snapshot: &StoreSnapshot, max_attempts: u32) -> bool {
    invariant_unique_source_ids(&snapshot.sync_records)
        && invariant_unique_shop_refs(snapshot)
        && snapshot.sync_records.iter().all(|r| {
            invariant_retry_bounded(r, max_attempts) && invariant_acknowledged_has_destination(r)
        })
}
