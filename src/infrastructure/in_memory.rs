use crate::domain::order::{Order, PaymentResult};
use crate::domain::ports::{OrderStore, SettleOutcome};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order store keyed by order number.
///
/// Uses `Arc<RwLock<HashMap<String, Order>>>` to allow shared concurrent access.
/// `settle` holds the write lock across the read-modify-write, so concurrent
/// duplicate callbacks apply at most once.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.order_number.clone(), order);
        Ok(())
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_number).cloned())
    }

    async fn settle(&self, order_number: &str, result: &PaymentResult) -> Result<SettleOutcome> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(order_number) else {
            return Ok(SettleOutcome::NotFound);
        };

        match order.settle(result) {
            Some(settled) => {
                *order = settled.clone();
                Ok(SettleOutcome::Applied(settled))
            }
            None => Ok(SettleOutcome::AlreadySettled(order.clone())),
        }
    }
}
