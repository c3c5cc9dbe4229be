//! In-memory record store.
//!
//! All three record sets sit behind one `RwLock`, so `snapshot()` is
//! consistent across sets. Each set keeps insertion order for listings and
//! secondary indexes for the join keys.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::{DestinationOrder, SourceOrder, StoreSnapshot, SyncError, SyncRecord};
use crate::ports::RecordStore;

/// Keyed rows that remember first-insertion order.
#[derive(Debug)]
struct Table<V> {
    rows: HashMap<String, V>,
    order: Vec<String>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<V: Clone> Table<V> {
    /// Replace in place, or append. Returns the previous row.
    fn upsert(&mut self, key: String, value: V) -> Option<V> {
        if !self.rows.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.rows.insert(key, value)
    }

    fn get(&self, key: &str) -> Option<V> {
        self.rows.get(key).cloned()
    }

    fn list(&self) -> Vec<V> {
        self.order
            .iter()
            .filter_map(|k| self.rows.get(k).cloned())
            .collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    source: Table<SourceOrder>,
    destination: Table<DestinationOrder>,
    sync: Table<SyncRecord>,
    /// shop_ref → destination id
    destination_by_shop_ref: HashMap<String, String>,
    /// source_order_id → sync_id
    sync_by_source_id: HashMap<String, String>,
}

/// Process-local `RecordStore`. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn put_source_order(&self, order: SourceOrder) -> Result<(), SyncError> {
        let mut tables = self.tables.write();
        tables.source.upsert(order.source_order_id.clone(), order);
        Ok(())
    }

    fn get_source_order(&self, source_order_id: &str) -> Option<SourceOrder> {
        self.tables.read().source.get(source_order_id)
    }

    fn list_source_orders(&self) -> Vec<SourceOrder> {
        self.tables.read().source.list()
    }

    fn put_destination_order(&self, order: DestinationOrder) -> Result<(), SyncError> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.destination_by_shop_ref.get(&order.shop_ref) {
            if *existing != order.id {
                return Err(SyncError::Store(format!(
                    "shop_ref {} already mapped to destination order {}",
                    order.shop_ref, existing
                )));
            }
        }
        tables
            .destination_by_shop_ref
            .insert(order.shop_ref.clone(), order.id.clone());
        tables.destination.upsert(order.id.clone(), order);
        Ok(())
    }

    fn get_destination_order(&self, id: &str) -> Option<DestinationOrder> {
        self.tables.read().destination.get(id)
    }

    fn find_destination_by_shop_ref(&self, shop_ref: &str) -> Option<DestinationOrder> {
        let tables = self.tables.read();
        tables
            .destination_by_shop_ref
            .get(shop_ref)
            .and_then(|id| tables.destination.get(id))
    }

    fn list_destination_orders(&self) -> Vec<DestinationOrder> {
        self.tables.read().destination.list()
    }

    fn put_sync_record(&self, record: SyncRecord) -> Result<(), SyncError> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.sync_by_source_id.get(&record.source_order_id) {
            if *existing != record.sync_id {
                return Err(SyncError::Store(format!(
                    "source order {} already tracked by sync record {}",
                    record.source_order_id, existing
                )));
            }
        }
        tables
            .sync_by_source_id
            .insert(record.source_order_id.clone(), record.sync_id.clone());
        tables.sync.upsert(record.sync_id.clone(), record);
        Ok(())
    }

    fn get_sync_record(&self, sync_id: &str) -> Option<SyncRecord> {
        self.tables.read().sync.get(sync_id)
    }

    fn find_sync_record_by_source_id(&self, source_order_id: &str) -> Option<SyncRecord> {
        let tables = self.tables.read();
        tables
            .sync_by_source_id
            .get(source_order_id)
            .and_then(|id| tables.sync.get(id))
    }

    fn list_sync_records(&self) -> Vec<SyncRecord> {
        self.tables.read().sync.list()
    }

    fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.read();
        StoreSnapshot {
            source_orders: tables.source.list(),
            destination_orders: tables.destination.list(),
            sync_records: tables.sync.list(),
        }
    }
}
