//! Order store backed by the hosted database's REST interface (PostgREST).
//!
//! Rows live in the `orders` table and are addressed by `order_number`. The
//! settle update is a compare-and-set: the `PATCH` carries a
//! `payment_status=eq.pending` filter, plus a filter on the fulfillment status
//! that was read whenever that column is written. When the row changed in
//! between, no row comes back and the transition is recomputed from a fresh
//! read.

use crate::config::StorageConfig;
use crate::domain::order::{Order, OrderStatus, PaymentResult, PaymentStatus};
use crate::domain::ports::{OrderStore, SettleOutcome};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const ORDERS_PATH: &str = "rest/v1/orders";
const SELECT: &str = "id,order_number,total,payment_status,status,vnpay_transaction_id";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SETTLE_ATTEMPTS: usize = 3;

/// Columns written by a settle.
#[derive(Debug, Serialize)]
struct SettlePatch<'a> {
    payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vnpay_transaction_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct RestOrderStore {
    client: Client,
    endpoint: String,
    service_key: String,
}

impl RestOrderStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/{ORDERS_PATH}", config.base_url.trim_end_matches('/')),
            service_key: config.service_key.clone(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Writes `next` only if the row still matches what `current` was read as.
    async fn update_if_unchanged(&self, current: &Order, next: &Order) -> Result<Option<Order>> {
        let status = (next.status != current.status).then_some(next.status);
        let patch = SettlePatch {
            payment_status: next.payment_status,
            status,
            vnpay_transaction_id: next
                .vnpay_transaction_id
                .as_deref()
                .filter(|_| next.vnpay_transaction_id != current.vnpay_transaction_id),
        };

        let mut filters = vec![
            ("select", SELECT.to_string()),
            ("order_number", format!("eq.{}", current.order_number)),
            ("payment_status", format!("eq.{}", PaymentStatus::Pending.as_str())),
        ];
        if status.is_some() {
            filters.push(("status", format!("eq.{}", current.status.as_str())));
        }

        let rows: Vec<Order> = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .query(&filters)
            .json(&patch)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl OrderStore for RestOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(&[order])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let rows: Vec<Order> = self
            .request(Method::GET)
            .query(&[
                ("select", SELECT.to_string()),
                ("order_number", format!("eq.{order_number}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn settle(&self, order_number: &str, result: &PaymentResult) -> Result<SettleOutcome> {
        for _ in 0..MAX_SETTLE_ATTEMPTS {
            let Some(current) = self.find_by_number(order_number).await? else {
                return Ok(SettleOutcome::NotFound);
            };
            let Some(next) = current.settle(result) else {
                return Ok(SettleOutcome::AlreadySettled(current));
            };

            if let Some(updated) = self.update_if_unchanged(&current, &next).await? {
                return Ok(SettleOutcome::Applied(updated));
            }
            debug!(order_number, "Order changed during settle, re-reading");
        }

        Err(PaymentError::Storage(format!(
            "order {order_number} kept changing during settle"
        )))
    }
}
