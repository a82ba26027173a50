//! InMemoryStore — HashMap-backed store for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Collection, StagedRow, Store, StoreError, Versioned};

/// Internal stored representation of a row.
struct StoredRow {
    bytes: Vec<u8>,
    version: u64,
}

type Rows = HashMap<String, StoredRow>;

/// In-memory store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`. Clone-friendly via Arc: clones share
/// the same rows and id sequence.
#[derive(Clone)]
pub struct InMemoryStore {
    rows: Arc<RwLock<Rows>>,
    seq: Arc<AtomicU64>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            seq: Arc::new(AtomicU64::new(1)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Rows>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn encode<C: Collection>(row: &C) -> Result<StagedRow, StoreError> {
        let bytes = serde_json::to_vec(row).map_err(|e| StoreError::Serde(e.to_string()))?;
        Ok(StagedRow {
            key: StagedRow::key_for(C::NAME, row.id()),
            bytes,
        })
    }

    fn decode<C: Collection>(stored: &StoredRow) -> Result<Versioned<C>, StoreError> {
        let data =
            serde_json::from_slice(&stored.bytes).map_err(|e| StoreError::Serde(e.to_string()))?;
        Ok(Versioned {
            data,
            version: stored.version,
        })
    }
}

impl Store for InMemoryStore {
    fn get<C: Collection>(&self, id: &str) -> Result<Option<Versioned<C>>, StoreError> {
        let rows = self.read()?;
        match rows.get(&StagedRow::key_for(C::NAME, id)) {
            Some(stored) => Ok(Some(Self::decode(stored)?)),
            None => Ok(None),
        }
    }

    fn insert<C: Collection>(&self, row: &C) -> Result<Versioned<C>, StoreError> {
        let staged = Self::encode(row)?;
        let mut rows = self.write()?;

        if let Some(existing) = rows.get(&staged.key) {
            return Err(StoreError::Conflict {
                collection: C::NAME.to_string(),
                id: row.id().to_string(),
                expected: 0,
                actual: existing.version,
            });
        }

        rows.insert(
            staged.key,
            StoredRow {
                bytes: staged.bytes,
                version: 1,
            },
        );

        Ok(Versioned {
            data: row.clone(),
            version: 1,
        })
    }

    fn update<C: Collection>(
        &self,
        row: &C,
        expected_version: u64,
    ) -> Result<Versioned<C>, StoreError> {
        let staged = Self::encode(row)?;
        let mut rows = self.write()?;

        let actual = match rows.get(&staged.key) {
            Some(existing) => existing.version,
            None => {
                return Err(StoreError::NotFound {
                    collection: C::NAME.to_string(),
                    id: row.id().to_string(),
                })
            }
        };

        if actual != expected_version {
            return Err(StoreError::Conflict {
                collection: C::NAME.to_string(),
                id: row.id().to_string(),
                expected: expected_version,
                actual,
            });
        }

        let version = actual + 1;
        rows.insert(
            staged.key,
            StoredRow {
                bytes: staged.bytes,
                version,
            },
        );

        Ok(Versioned {
            data: row.clone(),
            version,
        })
    }

    fn find<C: Collection>(
        &self,
        predicate: &dyn Fn(&C) -> bool,
    ) -> Result<Vec<Versioned<C>>, StoreError> {
        let rows = self.read()?;
        let prefix = format!("{}:", C::NAME);

        let mut results = Vec::new();
        for stored in rows
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, stored)| stored)
        {
            // Rows that no longer decode are skipped rather than failing
            // the whole scan.
            if let Ok(versioned) = Self::decode::<C>(stored) {
                if predicate(&versioned.data) {
                    results.push(versioned);
                }
            }
        }

        Ok(results)
    }

    fn allocate_id(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn apply_batch(&self, staged: Vec<StagedRow>) -> Result<(), StoreError> {
        let mut rows = self.write()?;

        // Check every key before touching any — the batch is all-or-nothing.
        for row in &staged {
            if let Some(existing) = rows.get(&row.key) {
                let (collection, id) = row
                    .key
                    .split_once(':')
                    .unwrap_or((row.key.as_str(), ""));
                return Err(StoreError::Conflict {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    expected: 0,
                    actual: existing.version,
                });
            }
        }

        for row in staged {
            rows.insert(
                row.key,
                StoredRow {
                    bytes: row.bytes,
                    version: 1,
                },
            );
        }

        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rows = self.read()?;
        Ok(rows.get(key).map(|s| s.bytes.clone()))
    }

    fn save_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut rows = self.write()?;
        let version = rows.get(key).map(|s| s.version + 1).unwrap_or(1);
        rows.insert(key.to_string(), StoredRow { bytes, version });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{Order, OrderItem, OrderStatus, PaymentStatus};
    use rust_decimal::Decimal;
    use std::time::SystemTime;

    fn order(id: &str, user_id: &str) -> Order {
        let now = SystemTime::now();
        Order {
            id: id.into(),
            user_id: user_id.into(),
            total_amount: Decimal::new(4160, 2),
            tax_amount: Decimal::new(360, 2),
            shipping_address: "12 Hill Road".into(),
            city: "Pune".into(),
            state: "MH".into(),
            pincode: "411001".into(),
            phone: "9999999999".into(),
            payment_method: "cod".into(),
            payment_status: PaymentStatus::Completed,
            order_status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(id: &str, order_id: &str) -> OrderItem {
        OrderItem {
            id: id.into(),
            order_id: order_id.into(),
            product_id: "7".into(),
            product_name: "Oxford Shirt".into(),
            department: "clothing".into(),
            subcategory: "shirts".into(),
            price: Decimal::new(2000, 2),
            quantity: 2,
            image: "/img/shirts/7.jpg".into(),
        }
    }

    #[test]
    fn insert_then_get() {
        let store = InMemoryStore::new();

        let inserted = store.insert(&order("1", "user-1")).unwrap();
        assert_eq!(inserted.version, 1);

        let loaded = store.get::<Order>("1").unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.data.user_id, "user-1");
        assert_eq!(loaded.data.total_amount, Decimal::new(4160, 2));
    }

    #[test]
    fn get_missing_is_none() {
        let store = InMemoryStore::new();
        assert!(store.get::<Order>("missing").unwrap().is_none());
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let store = InMemoryStore::new();
        store.insert(&order("1", "user-1")).unwrap();

        let err = store.insert(&order("1", "user-2")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        // The original row wins.
        let kept = store.get::<Order>("1").unwrap().unwrap();
        assert_eq!(kept.data.user_id, "user-1");
    }

    #[test]
    fn collections_do_not_collide_on_id() {
        let store = InMemoryStore::new();
        store.insert(&order("1", "user-1")).unwrap();
        store.insert(&item("1", "1")).unwrap();

        assert!(store.get::<Order>("1").unwrap().is_some());
        assert!(store.get::<OrderItem>("1").unwrap().is_some());
    }

    #[test]
    fn update_bumps_version() {
        let store = InMemoryStore::new();
        store.insert(&order("1", "user-1")).unwrap();

        let mut shipped = order("1", "user-1");
        shipped.order_status = OrderStatus::Shipped;

        let updated = store.update(&shipped, 1).unwrap();
        assert_eq!(updated.version, 2);

        let loaded = store.get::<Order>("1").unwrap().unwrap();
        assert_eq!(loaded.data.order_status, OrderStatus::Shipped);
    }

    #[test]
    fn update_stale_version_conflicts() {
        let store = InMemoryStore::new();
        store.insert(&order("1", "user-1")).unwrap();

        let err = store.update(&order("1", "user-1"), 99).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 99,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.update(&order("ghost", "user-1"), 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn find_scans_one_collection() {
        let store = InMemoryStore::new();
        store.insert(&order("1", "user-1")).unwrap();
        store.insert(&item("2", "1")).unwrap();
        store.insert(&item("3", "1")).unwrap();
        store.insert(&item("4", "other")).unwrap();

        let items = store.find::<OrderItem>(&|i| i.order_id == "1").unwrap();
        assert_eq!(items.len(), 2);

        let orders = store.find::<Order>(&|_| true).unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn allocate_id_is_sequential() {
        let store = InMemoryStore::new();
        let first = store.allocate_id();
        let second = store.allocate_id();
        assert_eq!(second, first + 1);
    }

    #[test]
    fn clone_shares_rows_and_sequence() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        store.insert(&order("1", "user-1")).unwrap();
        store.allocate_id();

        assert!(clone.get::<Order>("1").unwrap().is_some());
        assert_eq!(clone.allocate_id(), 2);
    }

    #[test]
    fn raw_rows_roundtrip() {
        let store = InMemoryStore::new();
        store
            .save_raw("shirts:7", br#"{"id":"7"}"#.to_vec())
            .unwrap();

        let bytes = store.get_raw("shirts:7").unwrap().unwrap();
        assert_eq!(bytes, br#"{"id":"7"}"#);
        assert!(store.get_raw("shirts:8").unwrap().is_none());
    }

    #[test]
    fn batch_conflict_applies_nothing() {
        let store = InMemoryStore::new();
        store.insert(&item("3", "planted")).unwrap();

        let staged = vec![
            StagedRow {
                key: StagedRow::key_for(Order::NAME, "1"),
                bytes: serde_json::to_vec(&order("1", "user-1")).unwrap(),
            },
            StagedRow {
                key: StagedRow::key_for(OrderItem::NAME, "2"),
                bytes: serde_json::to_vec(&item("2", "1")).unwrap(),
            },
            StagedRow {
                key: StagedRow::key_for(OrderItem::NAME, "3"),
                bytes: serde_json::to_vec(&item("3", "1")).unwrap(),
            },
        ];

        let err = store.apply_batch(staged).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        assert!(store.get::<Order>("1").unwrap().is_none());
        assert!(store.get::<OrderItem>("2").unwrap().is_none());
        let survivor = store.get::<OrderItem>("3").unwrap().unwrap();
        assert_eq!(survivor.data.order_id, "planted");
    }
}
