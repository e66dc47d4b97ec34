use crate::error::PaymentError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The provider's response code for a successful payment.
pub const SUCCESS_CODE: &str = "00";

/// Represents a positive monetary amount in major currency units (VND).
///
/// This is a wrapper around `rust_decimal::Decimal` so that an order total or a
/// checkout amount can never be zero or negative once constructed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidRequest(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to the provider's minor-unit integer: `amount * 100`, rounded
    /// half away from zero.
    pub fn to_minor_units(&self) -> Result<u64, PaymentError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|scaled| scaled.to_u64())
            .ok_or_else(|| {
                PaymentError::InvalidRequest("Amount is out of range".to_string())
            })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// A row of the `orders` table, restricted to the columns payment touches.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: String,
    /// Human-readable number, sent to the provider as the transaction reference.
    pub order_number: String,
    pub total: Amount,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Fulfillment status.
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub vnpay_transaction_id: Option<String>,
}

/// An authenticated payment result reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResult {
    pub response_code: String,
    pub transaction_no: Option<String>,
}

impl PaymentResult {
    pub fn is_success(&self) -> bool {
        self.response_code == SUCCESS_CODE
    }
}

impl Order {
    pub fn new(id: impl Into<String>, order_number: impl Into<String>, total: Amount) -> Self {
        Self {
            id: id.into(),
            order_number: order_number.into(),
            total,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            vnpay_transaction_id: None,
        }
    }

    /// Applies an authenticated payment result.
    ///
    /// Returns the updated order, or `None` when the payment status is already
    /// terminal and the result must not be applied again.
    pub fn settle(&self, result: &PaymentResult) -> Option<Order> {
        if self.payment_status.is_terminal() {
            return None;
        }

        let mut next = self.clone();
        if result.is_success() {
            next.payment_status = PaymentStatus::Paid;
            if result.transaction_no.is_some() {
                next.vnpay_transaction_id = result.transaction_no.clone();
            }
            if next.status == OrderStatus::Pending {
                next.status = OrderStatus::Processing;
            }
        } else {
            next.payment_status = PaymentStatus::Failed;
        }
        Some(next)
    }
}
