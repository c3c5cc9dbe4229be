//! # End-to-End Pipeline Tests
//!
//! Boots the pipeline from environment-style configuration, lets the timers
//! drive it, and checks the operator-facing views.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use order_sync::{ComponentStatus, OrderStatus, OrderSyncApi, Scenario};
    use sync_runtime::container::{RuntimeConfig, SyncContainer};
    use sync_runtime::demo::{self, order};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Deterministic configuration as the runtime would load it.
    fn config_from(vars: &[(&str, &str)]) -> RuntimeConfig {
        let mut env: HashMap<String, String> = [
            ("ORDER_SYNC_SYNC_INTERVAL_MS", "100"),
            ("ORDER_SYNC_RECONCILE_INTERVAL_MS", "150"),
            ("ORDER_SYNC_WMS_LATENCY_MS", "0"),
            ("ORDER_SYNC_WMS_FAILURE_RATE", "0"),
            ("ORDER_SYNC_WMS_RANDOM_FAILURE_RATE", "0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        env.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = RuntimeConfig::from_lookup(|key| env.get(key).cloned()).unwrap();
        config.validate().unwrap();
        config
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
    // TIMER-DRIVEN RUNS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_sync_timer_drives_retries_to_dead_letter() {
        let container = SyncContainer::new(config_from(&[]));
        container.service.start();
        container
            .service
            .inject_source_order(order("ORD-1", "A", "US", "WGT-100", 1), None)
            .unwrap();
        let failing = container
            .service
            .inject_source_order(order("ORD-2", "B", "US", "WGT-100", 1), Some(Scenario::FailHard))
            .unwrap();

        container.service.start_sync();
        assert!(container.service.is_sync_enabled());

        // Sweeps at 0, 100, 200 and 300ms
        tokio::time::sleep(Duration::from_millis(350)).await;
        container.service.wait_idle().await;

        assert_eq!(status_of(&container, "ORD-1"), OrderStatus::AcknowledgedByWms);
        assert_eq!(status_of(&container, &failing), OrderStatus::DeadLetter);
        assert_eq!(container.service.list_dead_letters()[0].retry_count, 3);

        container.service.stop_sync();
        assert!(!container.service.is_sync_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_enqueues_nothing() {
        let container = SyncContainer::new(config_from(&[]));
        container.service.start();

        container.service.start_sync();
        container.service.stop_sync();
        container.service.wait_idle().await;

        container
            .service
            .inject_source_order(order("ORD-1", "A", "US", "WGT-100", 1), None)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(status_of(&container, "ORD-1"), OrderStatus::PendingPull);
        assert_eq!(container.service.queue_length(), 0);
    }

    // =============================================================================
    // RUNTIME BOOT PATH
    // =============================================================================

    #[tokio::test]
    async fn test_demo_seed_single_sweep() {
        let container = SyncContainer::new(config_from(&[("ORDER_SYNC_SEED_DEMO", "true")]));
        assert!(container.config.seed_demo_orders);
        container.service.start();

        let ids = demo::seed(container.service.as_ref()).unwrap();
        container.service.enqueue_fetch().unwrap();
        container.service.wait_idle().await;

        assert_eq!(status_of(&container, &ids[0]), OrderStatus::AcknowledgedByWms);
        assert_eq!(status_of(&container, &ids[1]), OrderStatus::AcknowledgedByWms);
        assert_eq!(status_of(&container, &ids[2]), OrderStatus::Failed);
        assert_eq!(status_of(&container, &ids[3]), OrderStatus::AcknowledgedByWms);
        assert_eq!(container.service.debug_destination_orders().len(), 3);
    }

    #[tokio::test]
    async fn test_health_report_shape() {
        let container = SyncContainer::new(config_from(&[]));
        container.service.start();
        container.service.start_reconcile();

        let health = container.service.system_health();
        assert!(health.is_healthy);
        assert_eq!(health.queue.status, ComponentStatus::Up);

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["erp"], "UP");
        assert_eq!(json["wms"], "UP");
        assert_eq!(json["isHealthy"], true);
        assert_eq!(json["queue"]["status"], "UP");
        assert_eq!(json["queue"]["length"], 0);
        assert_eq!(json["jobs"]["sync"], false);
        assert_eq!(json["jobs"]["reconcile"], true);

        container.service.shutdown(Duration::from_secs(1)).await;
        let health = container.service.system_health();
        assert_eq!(health.queue.status, ComponentStatus::Down);
        assert!(!health.jobs.reconcile);
    }

    #[test]
    fn test_invalid_environment_is_rejected() {
        let env: HashMap<&str, &str> = [("ORDER_SYNC_WMS_FAILURE_RATE", "2.0")].into();
        let config =
            RuntimeConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
        assert!(config.validate().is_err());
    }
}
