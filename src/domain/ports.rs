use super::order::{Order, PaymentResult};
use crate::error::Result;
use async_trait::async_trait;

/// Result of applying a payment result to the order store.
#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
    /// The order was pending and has been updated.
    Applied(Order),
    /// The order already carried a terminal payment status; nothing was written.
    AlreadySettled(Order),
    NotFound,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;
    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>>;
    /// Applies `result` to the order keyed by `order_number` as a single
    /// conditional update on `payment_status = pending`.
    async fn settle(&self, order_number: &str, result: &PaymentResult) -> Result<SettleOutcome>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
