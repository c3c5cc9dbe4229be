//! Upstream system backed by the source record set.
//!
//! Orders land in the store through injection (or a future connector); a
//! fetch returns those not yet tracked by any sync record.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{SourceOrder, SyncError};
use crate::ports::{RecordStore, SourceSystem};

/// `SourceSystem` reading from the shared record store.
pub struct StoreBackedSource {
    store: Arc<dyn RecordStore>,
}

impl StoreBackedSource {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SourceSystem for StoreBackedSource {
    async fn fetch_new_orders(&self) -> Result<Vec<SourceOrder>, SyncError> {
        let snapshot = self.store.snapshot();
        let known: std::collections::HashSet<&str> = snapshot
            .sync_records
            .iter()
            .map(|r| r.source_order_id.as_str())
            .collect();

        Ok(snapshot
            .source_orders
            .iter()
            .filter(|o| !known.contains(o.source_order_id.as_str()))
            .cloned()
            .collect())
    }

    fn system_id(&self) -> &str {
        "erp"
    }
}
