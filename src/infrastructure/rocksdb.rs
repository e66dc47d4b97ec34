use crate::domain::order::{Order, PaymentResult};
use crate::domain::ports::{OrderStore, SettleOutcome};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing orders keyed by order number.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store implementation using RocksDB.
///
/// Orders are stored as JSON under their order number. RocksDB has no
/// conditional put, so settles are serialised through an async mutex shared by
/// all clones; a settle's read and write therefore cannot interleave with
/// another settle.
#[derive(Clone)]
pub struct RocksDbOrderStore {
    db: Arc<DB>,
    settle_lock: Arc<Mutex<()>>,
}

impl RocksDbOrderStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            settle_lock: Arc::new(Mutex::new(())),
        })
    }

    fn put(&self, order: &Order) -> Result<()> {
        let cf = self.orders_cf()?;
        let value = serde_json::to_vec(order)?;
        self.db.put_cf(cf, order.order_number.as_bytes(), value)?;
        Ok(())
    }

    fn load(&self, order_number: &str) -> Result<Option<Order>> {
        let cf = self.orders_cf()?;
        match self.db.get_cf(cf, order_number.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn orders_cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| PaymentError::Storage("Orders column family not found".to_string()))
    }
}

#[async_trait]
impl OrderStore for RocksDbOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.put(&order)
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        self.load(order_number)
    }

    async fn settle(&self, order_number: &str, result: &PaymentResult) -> Result<SettleOutcome> {
        let _guard = self.settle_lock.lock().await;

        let Some(current) = self.load(order_number)? else {
            return Ok(SettleOutcome::NotFound);
        };
        match current.settle(result) {
            Some(next) => {
                self.put(&next)?;
                Ok(SettleOutcome::Applied(next))
            }
            None => Ok(SettleOutcome::AlreadySettled(current)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, PaymentStatus};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn order() -> Order {
        Order::new("o1", "ORD123", Amount::new(dec!(500000)).unwrap())
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbOrderStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_ORDERS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_order_store() {
        let dir = tempdir().unwrap();
        let store = RocksDbOrderStore::open(dir.path()).unwrap();

        store.insert(order()).await.unwrap();

        let retrieved = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(retrieved, order());
        assert!(store.find_by_number("ORD999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_settle_survives_reopen() {
        let dir = tempdir().unwrap();
        let failure = PaymentResult {
            response_code: "24".to_string(),
            transaction_no: None,
        };

        {
            let store = RocksDbOrderStore::open(dir.path()).unwrap();
            store.insert(order()).await.unwrap();
            let outcome = store.settle("ORD123", &failure).await.unwrap();
            assert!(matches!(outcome, SettleOutcome::Applied(_)));
        }

        let store = RocksDbOrderStore::open(dir.path()).unwrap();
        let reopened = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(reopened.payment_status, PaymentStatus::Failed);

        let again = store.settle("ORD123", &failure).await.unwrap();
        assert_eq!(again, SettleOutcome::AlreadySettled(reopened));
    }
}
