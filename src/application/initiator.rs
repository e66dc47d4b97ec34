use crate::config::GatewayConfig;
use crate::domain::order::Amount;
use crate::domain::params::{self, PaymentParams};
use crate::domain::signing;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{debug, info};

pub const PROTOCOL_VERSION: &str = "2.1.0";
pub const PAY_COMMAND: &str = "pay";
pub const CURRENCY: &str = "VND";
pub const ORDER_TYPE: &str = "other";
/// Sent when the customer's address cannot be determined.
pub const FALLBACK_IP: &str = "127.0.0.1";
/// How long the hosted checkout page accepts the payment.
pub const PAYMENT_WINDOW_MINUTES: i64 = 15;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Checkout request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub order_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrl {
    pub payment_url: String,
}

/// Builds signed redirect URLs to the provider's hosted checkout page.
///
/// Has no side effects on order state: every call returns a fresh, independently
/// valid URL.
#[derive(Debug, Clone)]
pub struct PaymentInitiator {
    config: GatewayConfig,
}

impl PaymentInitiator {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn create_payment_url(
        &self,
        request: &PaymentRequest,
        client_ip: Option<IpAddr>,
        now: DateTime<Utc>,
    ) -> Result<PaymentUrl> {
        let order_id = non_empty(request.order_id.as_deref())
            .ok_or_else(|| PaymentError::InvalidRequest("Missing required fields".to_string()))?;
        let amount = request
            .amount
            .ok_or_else(|| PaymentError::InvalidRequest("Missing required fields".to_string()))
            .and_then(Amount::new)?;
        let minor_units = amount.to_minor_units()?;
        if minor_units == 0 {
            return Err(PaymentError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }

        if self.config.tmn_code.is_empty() || self.config.hash_secret.is_empty() {
            return Err(PaymentError::Configuration(
                "VNPay credentials are not configured".to_string(),
            ));
        }

        let txn_ref = non_empty(request.order_number.as_deref()).unwrap_or(order_id);
        let order_info = non_empty(request.order_info.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Thanh toan don hang {txn_ref}"));
        let expires = now + Duration::minutes(PAYMENT_WINDOW_MINUTES);

        let mut fields = PaymentParams::new();
        fields.insert(params::VERSION, PROTOCOL_VERSION);
        fields.insert(params::COMMAND, PAY_COMMAND);
        fields.insert(params::TMN_CODE, self.config.tmn_code.as_str());
        fields.insert(params::LOCALE, self.config.locale.as_str());
        fields.insert(params::CURR_CODE, CURRENCY);
        fields.insert(params::TXN_REF, txn_ref);
        fields.insert(params::ORDER_INFO, order_info);
        fields.insert(params::ORDER_TYPE, ORDER_TYPE);
        fields.insert(params::AMOUNT, minor_units.to_string());
        fields.insert(params::RETURN_URL, self.config.return_url.as_str());
        fields.insert(
            params::IP_ADDR,
            client_ip.map_or_else(|| FALLBACK_IP.to_string(), |ip| ip.to_string()),
        );
        fields.insert(params::CREATE_DATE, now.format(TIMESTAMP_FORMAT).to_string());
        fields.insert(params::EXPIRE_DATE, expires.format(TIMESTAMP_FORMAT).to_string());

        let canonical = signing::canonicalize(&fields);
        let signature = signing::sign(&self.config.hash_secret, &canonical)?;

        let separator = if self.config.payment_url.contains('?') { '&' } else { '?' };
        let payment_url = format!(
            "{}{separator}{canonical}&{}={signature}",
            self.config.payment_url,
            params::SECURE_HASH
        );

        debug!(order_id, txn_ref, "Signed payment parameters");
        info!(txn_ref, "Created VNPay payment URL");

        Ok(PaymentUrl { payment_url })
    }
}

/// Blank values count as absent; others pass through untrimmed.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
