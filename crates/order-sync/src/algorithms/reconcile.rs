//! Reconciliation diff over a store snapshot.
//!
//! Both passes are O(source + destination + sync): the destination side is
//! indexed by `shop_ref` and sync records by `source_order_id` before the
//! source orders are walked once.

use std::collections::{HashMap, HashSet};

use crate::domain::{
    Discrepancy, DiscrepancyKind, ReconciliationSummary, StoreSnapshot, SyncRecord, SyncState,
    NO_SYNC_RECORD,
};

/// Details attached to every orphan finding.
pub const ORPHAN_DETAILS: &str = "Exists in WMS but not in ERP source";

struct Join<'a> {
    source_ids: HashSet<&'a str>,
    destination_refs: HashSet<&'a str>,
    records: HashMap<&'a str, &'a SyncRecord>,
}

impl<'a> Join<'a> {
    fn build(snapshot: &'a StoreSnapshot) -> Self {
        Self {
            source_ids: snapshot
                .source_orders
                .iter()
                .map(|o| o.source_order_id.as_str())
                .collect(),
            destination_refs: snapshot
                .destination_orders
                .iter()
                .map(|d| d.shop_ref.as_str())
                .collect(),
            records: snapshot
                .sync_records
                .iter()
                .map(|r| (r.source_order_id.as_str(), r))
                .collect(),
        }
    }

    fn state_of(&self, source_order_id: &str) -> Option<SyncState> {
        self.records.get(source_order_id).map(|r| r.state)
    }
}

/// Partition source orders into reconciliation buckets and count orphans.
pub fn summarize(snapshot: &StoreSnapshot) -> ReconciliationSummary {
    let join = Join::build(snapshot);
    let mut summary = ReconciliationSummary::default();

    for order in &snapshot.source_orders {
        let id = order.source_order_id.as_str();
        let state = join.state_of(id);

        if join.destination_refs.contains(id) {
            if state == Some(SyncState::AcknowledgedByWms) {
                summary.in_sync += 1;
            } else {
                summary.status_mismatch += 1;
            }
        } else if state.is_some_and(|s| s.is_failure()) {
            summary.failed += 1;
        } else {
            summary.only_in_erp += 1;
        }
    }

    summary.only_in_wms = snapshot
        .destination_orders
        .iter()
        .filter(|d| !join.source_ids.contains(d.shop_ref.as_str()))
        .count();

    summary.mismatches = summary.failed + summary.status_mismatch + summary.only_in_wms;
    summary
}

/// Itemized findings: source-side entries in store order, then orphans.
///
/// A source order that is both absent downstream and `FAILED` yields two
/// entries, one per finding.
pub fn itemize(snapshot: &StoreSnapshot) -> Vec<Discrepancy> {
    let join = Join::build(snapshot);
    let mut findings = Vec::new();

    for order in &snapshot.source_orders {
        let id = order.source_order_id.as_str();
        let record = join.records.get(id);

        if !join.destination_refs.contains(id) {
            let details = match record {
                Some(r) => format!("State: {}", r.state),
                None => NO_SYNC_RECORD.to_string(),
            };
            findings.push(Discrepancy {
                source_order_id: id.to_string(),
                issue: DiscrepancyKind::MissingInDestination,
                details: Some(details),
            });
        }

        if let Some(r) = record.filter(|r| r.state == SyncState::Failed) {
            findings.push(Discrepancy {
                source_order_id: id.to_string(),
                issue: DiscrepancyKind::SyncFailed,
                details: r.last_error.clone(),
            });
        }
    }

    findings.extend(
        snapshot
            .destination_orders
            .iter()
            .filter(|d| !join.source_ids.contains(d.shop_ref.as_str()))
            .map(|d| Discrepancy {
                source_order_id: d.shop_ref.clone(),
                issue: DiscrepancyKind::OrphanInDestination,
                details: Some(ORPHAN_DETAILS.to_string()),
            }),
    );

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::to_submission;
    use crate::domain::entities::fixtures::source_order;
    use crate::domain::{DestinationOrder, SourceOrder};
    use proptest::prelude::*;

    fn destination_for(shop_ref: &str) -> DestinationOrder {
        DestinationOrder::from_submission(
            format!("wms-{shop_ref}"),
            to_submission(&source_order(shop_ref)),
            0,
        )
    }

    fn record(order: &SourceOrder, state: SyncState) -> SyncRecord {
        let mut r = SyncRecord::new(format!("sync-{}", order.source_order_id), order.clone(), 0);
        r.state = state;
        if state == SyncState::Failed {
            r.retry_count = 1;
            r.last_error = Some("Random network error".into());
        }
        if state == SyncState::AcknowledgedByWms {
            r.destination_id = Some(format!("wms-{}", order.source_order_id));
        }
        r
    }

    fn mixed_snapshot() -> StoreSnapshot {
        let synced = source_order("ORD-1");
        let failed = source_order("ORD-2");
        let fresh = source_order("ORD-3");
        let dead = source_order("ORD-4");
        let lagging = source_order("ORD-5");

        StoreSnapshot {
            sync_records: vec![
                record(&synced, SyncState::AcknowledgedByWms),
                record(&failed, SyncState::Failed),
                record(&dead, SyncState::DeadLetter),
                record(&lagging, SyncState::PendingSync),
            ],
            source_orders: vec![synced, failed, fresh, dead, lagging],
            destination_orders: vec![
                destination_for("ORD-1"),
                destination_for("ORD-5"),
                destination_for("GHOST-1"),
            ],
        }
    }

    #[test]
    fn test_empty_snapshot_is_clean() {
        let summary = summarize(&StoreSnapshot::default());
        assert_eq!(summary, ReconciliationSummary::default());
        assert!(itemize(&StoreSnapshot::default()).is_empty());
    }

    #[test]
    fn test_summary_buckets() {
        let summary = summarize(&mixed_snapshot());
        assert_eq!(summary.in_sync, 1);
        assert_eq!(summary.status_mismatch, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.only_in_erp, 1);
        assert_eq!(summary.only_in_wms, 1);
        assert_eq!(summary.mismatches, 4);
    }

    #[test]
    fn test_itemized_report_grouping() {
        let findings = itemize(&mixed_snapshot());
        let kinds: Vec<_> = findings
            .iter()
            .map(|f| (f.source_order_id.as_str(), f.issue))
            .collect();

        assert_eq!(
            kinds,
            vec![
                ("ORD-2", DiscrepancyKind::MissingInDestination),
                ("ORD-2", DiscrepancyKind::SyncFailed),
                ("ORD-3", DiscrepancyKind::MissingInDestination),
                ("ORD-4", DiscrepancyKind::MissingInDestination),
                ("GHOST-1", DiscrepancyKind::OrphanInDestination),
            ]
        );
    }

    #[test]
    fn test_itemized_details() {
        let findings = itemize(&mixed_snapshot());
        assert_eq!(findings[0].details.as_deref(), Some("State: FAILED"));
        assert_eq!(findings[1].details.as_deref(), Some("Random network error"));
        assert_eq!(findings[2].details.as_deref(), Some(NO_SYNC_RECORD));
        assert_eq!(findings[4].details.as_deref(), Some(ORPHAN_DETAILS));
    }

    fn state_strategy() -> impl Strategy<Value = Option<SyncState>> {
        prop_oneof![
            Just(None),
            Just(Some(SyncState::PendingSync)),
            Just(Some(SyncState::AcknowledgedByWms)),
            Just(Some(SyncState::Failed)),
            Just(Some(SyncState::DeadLetter)),
        ]
    }

    proptest! {
        #[test]
        fn prop_partition_is_complete(
            sources in prop::collection::vec((state_strategy(), any::<bool>()), 0..40),
            orphans in 0usize..10,
        ) {
            let mut snapshot = StoreSnapshot::default();
            for (i, (state, downstream)) in sources.iter().enumerate() {
                let order = source_order(&format!("ORD-{i}"));
                if let Some(state) = state {
                    snapshot.sync_records.push(record(&order, *state));
                }
                if *downstream {
                    snapshot.destination_orders.push(destination_for(&order.source_order_id));
                }
                snapshot.source_orders.push(order);
            }
            for i in 0..orphans {
                snapshot.destination_orders.push(destination_for(&format!("GHOST-{i}")));
            }

            let s = summarize(&snapshot);
            prop_assert_eq!(
                s.in_sync + s.status_mismatch + s.failed + s.only_in_erp,
                snapshot.source_orders.len()
            );
            prop_assert_eq!(
                s.in_sync + s.status_mismatch + s.only_in_wms,
                snapshot.destination_orders.len()
            );
            prop_assert_eq!(s.only_in_wms, orphans);
            prop_assert_eq!(s.mismatches, s.failed + s.status_mismatch + s.only_in_wms);

            let missing = itemize(&snapshot)
                .iter()
                .filter(|d| d.issue == DiscrepancyKind::MissingInDestination)
                .count();
            prop_assert_eq!(missing, s.failed + s.only_in_erp);
        }
    }
}
