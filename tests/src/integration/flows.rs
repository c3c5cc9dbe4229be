//! # Integration Test Flows
//!
//! Drives the pipeline through `OrderSyncApi` the way an operator would:
//! inject orders, run fetch sweeps, inspect the dead-letter queue, replay.
//!
//! ## Flows Tested:
//!
//! 1. **Happy path**: a clean order is pulled, pushed and acknowledged
//! 2. **Retry exhaustion**: a hard-failing order is dead-lettered after three sweeps
//! 3. **Replay**: once the destination recovers, a replayed order is acknowledged
//! 4. **Idempotency**: duplicate injections and resubmissions never duplicate
//!    downstream orders

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use order_sync::{
        to_submission, DestinationOrder, DestinationSystem, DiscrepancyKind, MockTimeSource,
        OrderStatus, OrderSyncApi, RecordStore, Scenario, SimulatedDestinationConfig,
        SubmitOutcome, SyncConfig, SyncState,
    };
    use sync_runtime::container::{RuntimeConfig, SyncContainer};
    use sync_runtime::demo::order;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const T0: u64 = 1_700_000_000_000;

    fn pipeline_with(destination: SimulatedDestinationConfig) -> SyncContainer {
        let config = RuntimeConfig {
            sync: SyncConfig::for_testing(),
            destination,
            ..RuntimeConfig::default()
        };
        let container = SyncContainer::with_time_source(config, Arc::new(MockTimeSource::new(T0)));
        container.service.start();
        container
    }

    fn pipeline() -> SyncContainer {
        pipeline_with(SimulatedDestinationConfig::for_testing())
    }

    fn inject(container: &SyncContainer, id: &str, scenario: Scenario) -> String {
        container
            .service
            .inject_source_order(order(id, "Test Customer", "US", "WGT-100", 1), Some(scenario))
            .unwrap()
    }

    async fn sweep(container: &SyncContainer) {
        container.service.enqueue_fetch().unwrap();
        container.service.wait_idle().await;
    }

    fn status_of(container: &SyncContainer, id: &str) -> OrderStatus {
        container
            .service
            .list_orders()
            .into_iter()
            .find(|o| o.source_order_id == id)
            .map(|o| o.status)
            .unwrap()
    }

    // =============================================================================
    // PULL → PUSH → RETRY → DEAD LETTER → REPLAY
    // =============================================================================

    #[tokio::test]
    async fn test_clean_order_is_acknowledged() {
        let container = pipeline();
        inject(&container, "ORD-1", Scenario::Normal);
        assert_eq!(status_of(&container, "ORD-1"), OrderStatus::PendingPull);

        sweep(&container).await;

        let orders = container.service.list_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::AcknowledgedByWms);
        assert_eq!(orders[0].customer, "Test Customer");

        let destination_id = orders[0].destination_id.clone().unwrap();
        let downstream = container.store.get_destination_order(&destination_id).unwrap();
        assert_eq!(downstream.shop_ref, "ORD-1");
        assert_eq!(downstream.items[0].sku, "WGT-100");

        let summary = container.service.summary();
        assert_eq!(summary.in_sync, 1);
        assert_eq!(summary.mismatches, 0);
    }

    #[tokio::test]
    async fn test_hard_failure_dead_letters_then_replays() {
        let container = pipeline();
        inject(&container, "ORD-1", Scenario::Normal);
        let failing = inject(&container, "ORD-2", Scenario::FailHard);
        assert_eq!(failing, "FAIL_HARD-ORD-2");

        sweep(&container).await;
        assert_eq!(status_of(&container, "ORD-1"), OrderStatus::AcknowledgedByWms);
        assert_eq!(status_of(&container, &failing), OrderStatus::Failed);

        sweep(&container).await;
        sweep(&container).await;
        assert_eq!(status_of(&container, &failing), OrderStatus::DeadLetter);

        let dead = container.service.list_dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].source_order_id, failing);
        assert_eq!(dead[0].retry_count, 3);
        assert_eq!(
            dead[0].last_error,
            "Max retries reached. Last error: Simulated Hard Error (Maintenance)"
        );
        assert_eq!(dead[0].created_at, "2023-11-14T22:13:20.000Z");

        // Further sweeps leave the dead letter alone
        sweep(&container).await;
        let record = container.store.find_sync_record_by_source_id(&failing).unwrap();
        assert_eq!(record.retry_count, 3);

        let summary = container.service.summary();
        assert_eq!(summary.in_sync, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.mismatches, 1);

        let report = container.service.detailed_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].issue, DiscrepancyKind::MissingInDestination);
        assert_eq!(report[0].details.as_deref(), Some("State: DEAD_LETTER"));

        container.destination.set_scenario_failures(false);
        assert!(container.service.replay(&dead[0].id));
        container.service.wait_idle().await;

        assert_eq!(status_of(&container, &failing), OrderStatus::AcknowledgedByWms);
        assert!(container.service.list_dead_letters().is_empty());
        let summary = container.service.summary();
        assert_eq!(summary.in_sync, 2);
        assert_eq!(summary.mismatches, 0);
    }

    #[tokio::test]
    async fn test_failed_record_reported_twice() {
        let container = pipeline();
        let failing = inject(&container, "ORD-7", Scenario::FailHard);
        sweep(&container).await;

        let report = container.service.detailed_report();
        let issues: Vec<_> = report.iter().map(|d| d.issue).collect();
        assert_eq!(
            issues,
            vec![DiscrepancyKind::MissingInDestination, DiscrepancyKind::SyncFailed]
        );
        assert!(report.iter().all(|d| d.source_order_id == failing));
        assert_eq!(
            report[1].details.as_deref(),
            Some("Simulated Hard Error (Maintenance)")
        );

        let json = serde_json::to_value(&report[1]).unwrap();
        assert_eq!(json["issue"], "Sync Failed");
    }

    #[tokio::test]
    async fn test_replay_refuses_live_and_unknown_records() {
        let container = pipeline();
        inject(&container, "ORD-1", Scenario::Normal);
        sweep(&container).await;

        let record = container.store.find_sync_record_by_source_id("ORD-1").unwrap();
        assert!(!container.service.replay(&record.sync_id));
        assert!(!container.service.replay("does-not-exist"));

        let after = container.store.get_sync_record(&record.sync_id).unwrap();
        assert_eq!(after, record);
        assert_eq!(container.service.queue_length(), 0);
    }

    #[tokio::test]
    async fn test_random_failures_follow_configured_rate() {
        let always = SimulatedDestinationConfig {
            random_scenario_failure_rate: 1.0,
            ..SimulatedDestinationConfig::for_testing()
        };
        let container = pipeline_with(always);
        let flaky = inject(&container, "ORD-5", Scenario::FailRandom);
        for _ in 0..3 {
            sweep(&container).await;
        }
        let record = container.store.find_sync_record_by_source_id(&flaky).unwrap();
        assert_eq!(record.state, SyncState::DeadLetter);
        assert_eq!(
            record.last_error.as_deref(),
            Some("Max retries reached. Last error: Simulated Random Network Error")
        );

        let never = SimulatedDestinationConfig {
            random_scenario_failure_rate: 0.0,
            ..SimulatedDestinationConfig::for_testing()
        };
        let container = pipeline_with(never);
        let flaky = inject(&container, "ORD-5", Scenario::FailRandom);
        sweep(&container).await;
        assert_eq!(status_of(&container, &flaky), OrderStatus::AcknowledgedByWms);
    }

    // =============================================================================
    // IDEMPOTENCY
    // =============================================================================

    #[tokio::test]
    async fn test_duplicate_injection_tracks_one_order() {
        let container = pipeline();
        inject(&container, "ORD-3", Scenario::Duplicate);
        sweep(&container).await;
        sweep(&container).await;

        assert_eq!(container.service.debug_source_orders().len(), 1);
        assert_eq!(container.store.list_sync_records().len(), 1);
        assert_eq!(container.service.debug_destination_orders().len(), 1);
        assert_eq!(status_of(&container, "ORD-3"), OrderStatus::AcknowledgedByWms);
    }

    #[tokio::test]
    async fn test_resync_of_acknowledged_order_is_noop() {
        let container = pipeline();
        inject(&container, "ORD-1", Scenario::Normal);
        sweep(&container).await;

        let source = container.store.get_source_order("ORD-1").unwrap();
        container.service.enqueue_sync(source).unwrap();
        container.service.wait_idle().await;

        assert_eq!(container.service.debug_destination_orders().len(), 1);
        assert_eq!(container.store.list_sync_records().len(), 1);
    }

    #[tokio::test]
    async fn test_destination_is_idempotent_by_shop_ref() {
        let container = pipeline();
        let submission = to_submission(&order("ORD-9", "Test Customer", "US", "WGT-100", 1));

        let first = container.destination.submit_order(submission.clone()).await.unwrap();
        let second = container.destination.submit_order(submission).await.unwrap();

        let SubmitOutcome::Accepted { destination_id } = first else {
            panic!("expected acceptance");
        };
        assert_eq!(second, SubmitOutcome::Accepted { destination_id });
        assert_eq!(container.store.list_destination_orders().len(), 1);
    }

    // =============================================================================
    // RECONCILIATION
    // =============================================================================

    #[tokio::test]
    async fn test_orphan_destination_orders_are_flagged() {
        let container = pipeline();
        let ghost = DestinationOrder::from_submission(
            "wms-ghost".into(),
            to_submission(&order("GHOST-1", "Nobody", "US", "WGT-100", 1)),
            T0,
        );
        container.store.put_destination_order(ghost).unwrap();

        let summary = container.service.reconcile_now();
        assert_eq!(summary.only_in_wms, 1);
        assert_eq!(summary.mismatches, 1);

        let report = container.service.detailed_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].issue, DiscrepancyKind::OrphanInDestination);
        assert_eq!(report[0].source_order_id, "GHOST-1");
        assert_eq!(
            report[0].details.as_deref(),
            Some("Exists in WMS but not in ERP source")
        );
    }
}
