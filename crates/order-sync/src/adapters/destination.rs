//! Simulated downstream fulfillment system.
//!
//! Sleeps for the configured latency, fails a fraction of submissions, and
//! otherwise writes a destination order into the shared store. Submissions are
//! idempotent by `shop_ref`.
//!
//! With the `scenarios` feature, ids carrying `FAIL_RANDOM` or `FAIL_HARD`
//! fail probabilistically or always.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
#[cfg(feature = "scenarios")]
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SimulatedDestinationConfig;
use crate::domain::{DestinationOrder, OrderSubmission, SubmitOutcome, SyncError};
#[cfg(feature = "scenarios")]
use crate::domain::{FAIL_HARD_MARKER, FAIL_RANDOM_MARKER};
use crate::ports::{DestinationSystem, RecordStore, TimeSource};

pub const RANDOM_SCENARIO_ERROR: &str = "Simulated Random Network Error";
pub const HARD_SCENARIO_ERROR: &str = "Simulated Hard Error (Maintenance)";
pub const BASELINE_ERROR: &str = "Random network error";

/// `DestinationSystem` that stores accepted orders in the record store.
pub struct SimulatedDestination {
    store: Arc<dyn RecordStore>,
    time: Arc<dyn TimeSource>,
    config: SimulatedDestinationConfig,
    #[cfg(feature = "scenarios")]
    scenario_failures: AtomicBool,
}

impl SimulatedDestination {
    pub fn new(
        store: Arc<dyn RecordStore>,
        time: Arc<dyn TimeSource>,
        config: SimulatedDestinationConfig,
    ) -> Self {
        Self {
            store,
            time,
            config,
            #[cfg(feature = "scenarios")]
            scenario_failures: AtomicBool::new(true),
        }
    }

    /// Toggle the `FAIL_*` markers. With failures off, tagged orders behave
    /// like any other order (used to demonstrate replay after a fix).
    #[cfg(feature = "scenarios")]
    pub fn set_scenario_failures(&self, enabled: bool) {
        self.scenario_failures.store(enabled, Ordering::SeqCst);
    }

    /// Decide whether this submission fails, and why.
    ///
    /// Kept synchronous so the thread-local RNG never lives across an await.
    fn simulated_failure(&self, shop_ref: &str) -> Option<&'static str> {
        let mut rng = rand::thread_rng();

        #[cfg(feature = "scenarios")]
        if self.scenario_failures.load(Ordering::SeqCst) {
            if shop_ref.contains(FAIL_RANDOM_MARKER)
                && rng.gen_bool(clamp_rate(self.config.random_scenario_failure_rate))
            {
                return Some(RANDOM_SCENARIO_ERROR);
            }
            if shop_ref.contains(FAIL_HARD_MARKER) {
                return Some(HARD_SCENARIO_ERROR);
            }
        }
        #[cfg(not(feature = "scenarios"))]
        let _ = shop_ref;

        if rng.gen_bool(clamp_rate(self.config.baseline_failure_rate)) {
            return Some(BASELINE_ERROR);
        }
        None
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl DestinationSystem for SimulatedDestination {
    async fn submit_order(&self, submission: OrderSubmission) -> Result<SubmitOutcome, SyncError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(self.config.latency()).await;
        }

        if let Some(reason) = self.simulated_failure(&submission.shop_ref) {
            warn!(
                "[wms] Simulated failure for order {}: {}",
                submission.shop_ref, reason
            );
            return Ok(SubmitOutcome::Rejected {
                reason: reason.to_string(),
            });
        }

        if let Some(existing) = self.store.find_destination_by_shop_ref(&submission.shop_ref) {
            info!(
                "[wms] Order {} already exists as {}, idempotent success",
                submission.shop_ref, existing.id
            );
            return Ok(SubmitOutcome::Accepted {
                destination_id: existing.id,
            });
        }

        let id = Uuid::new_v4().to_string();
        let shop_ref = submission.shop_ref.clone();
        let order = DestinationOrder::from_submission(id.clone(), submission, self.time.now());
        self.store
            .put_destination_order(order)
            .map_err(|e| SyncError::Destination(e.to_string()))?;

        info!("[wms] Created order {} (ref: {})", id, shop_ref);
        Ok(SubmitOutcome::Accepted { destination_id: id })
    }

    fn system_id(&self) -> &str {
        "wms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRecordStore;
    use crate::algorithms::to_submission;
    use crate::domain::entities::fixtures::source_order;
    use crate::ports::MockTimeSource;

    fn simulator(config: SimulatedDestinationConfig) -> (Arc<InMemoryRecordStore>, SimulatedDestination) {
        let store = Arc::new(InMemoryRecordStore::new());
        let dest = SimulatedDestination::new(
            store.clone(),
            Arc::new(MockTimeSource::new(42)),
            config,
        );
        (store, dest)
    }

    #[tokio::test]
    async fn test_accepts_and_stores() {
        let (store, dest) = simulator(SimulatedDestinationConfig::for_testing());
        let outcome = dest
            .submit_order(to_submission(&source_order("ORD-1")))
            .await
            .unwrap();

        let SubmitOutcome::Accepted { destination_id } = outcome else {
            panic!("expected acceptance");
        };
        let stored = store.get_destination_order(&destination_id).unwrap();
        assert_eq!(stored.shop_ref, "ORD-1");
        assert_eq!(stored.created_at, 42);
    }

    #[tokio::test]
    async fn test_idempotent_by_shop_ref() {
        let (store, dest) = simulator(SimulatedDestinationConfig::for_testing());
        let submission = to_submission(&source_order("ORD-1"));

        let first = dest.submit_order(submission.clone()).await.unwrap();
        let second = dest.submit_order(submission).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_destination_orders().len(), 1);
    }

    #[tokio::test]
    async fn test_certain_baseline_failure() {
        let config = SimulatedDestinationConfig {
            baseline_failure_rate: 1.0,
            ..SimulatedDestinationConfig::for_testing()
        };
        let (store, dest) = simulator(config);
        let outcome = dest
            .submit_order(to_submission(&source_order("ORD-1")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                reason: BASELINE_ERROR.into()
            }
        );
        assert!(store.list_destination_orders().is_empty());
    }

    #[test]
    fn test_rate_clamping() {
        assert_eq!(clamp_rate(1.5), 1.0);
        assert_eq!(clamp_rate(-0.2), 0.0);
        assert_eq!(clamp_rate(f64::NAN), 0.0);
    }

    #[cfg(feature = "scenarios")]
    #[tokio::test]
    async fn test_hard_failure_marker() {
        let (_, dest) = simulator(SimulatedDestinationConfig::for_testing());
        let submission = to_submission(&source_order("FAIL_HARD-ORD-2"));

        for _ in 0..3 {
            let outcome = dest.submit_order(submission.clone()).await.unwrap();
            assert_eq!(
                outcome,
                SubmitOutcome::Rejected {
                    reason: HARD_SCENARIO_ERROR.into()
                }
            );
        }

        dest.set_scenario_failures(false);
        let outcome = dest.submit_order(submission).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
    }

    #[cfg(feature = "scenarios")]
    #[tokio::test]
    async fn test_random_marker_with_certain_rate() {
        let config = SimulatedDestinationConfig {
            random_scenario_failure_rate: 1.0,
            ..SimulatedDestinationConfig::for_testing()
        };
        let (_, dest) = simulator(config);
        let outcome = dest
            .submit_order(to_submission(&source_order("FAIL_RANDOM-ORD-3")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                reason: RANDOM_SCENARIO_ERROR.into()
            }
        );
    }
}
