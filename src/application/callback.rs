use crate::config::GatewayConfig;
use crate::domain::order::{PaymentResult, PaymentStatus};
use crate::domain::params::{self, PaymentParams};
use crate::domain::ports::{OrderStoreBox, SettleOutcome};
use crate::domain::{response_code, signing};
use crate::error::{PaymentError, Result};
use tracing::{error, info, warn};
use url::form_urlencoded;

/// What happened to a callback, for logs and tests.
///
/// The caller never sees this: every verdict ends in the same redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackVerdict {
    Paid,
    Failed,
    /// Authentic, but the order already had a terminal payment status.
    AlreadySettled,
    /// Missing or wrong signature. Nothing was written.
    Unauthenticated,
    UnknownReference,
    /// The update could not be written; the order needs manual reconciliation.
    StorageFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub verdict: CallbackVerdict,
    pub redirect_url: String,
}

/// Verifies provider callbacks and settles the matching order.
pub struct CallbackVerifier {
    config: GatewayConfig,
    store: OrderStoreBox,
}

impl CallbackVerifier {
    pub fn new(config: GatewayConfig, store: OrderStoreBox) -> Self {
        Self { config, store }
    }

    /// Handles one callback given its decoded query pairs.
    ///
    /// Only a missing hash secret is an error; every other failure is folded
    /// into the verdict so the customer is always sent back to the result page.
    pub async fn handle<I, K, V>(&self, query: I) -> Result<CallbackOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if self.config.hash_secret.is_empty() {
            error!("VNPay hash secret not configured");
            return Err(PaymentError::Configuration(
                "VNPay hash secret is not configured".to_string(),
            ));
        }

        let (fields, signature) = PaymentParams::from_query(query);
        let response_code = fields.get(params::RESPONSE_CODE).unwrap_or_default();
        let txn_ref = fields.get(params::TXN_REF).unwrap_or_default();
        let redirect_url = self.redirect_url(response_code, txn_ref);

        let verdict = if self.is_authentic(&fields, signature.as_deref())? {
            let result = PaymentResult {
                response_code: response_code.to_string(),
                transaction_no: fields
                    .get(params::TRANSACTION_NO)
                    .filter(|no| !no.is_empty())
                    .map(str::to_string),
            };
            self.settle(txn_ref, &result).await
        } else {
            warn!(txn_ref, "Rejected VNPay callback with invalid signature");
            CallbackVerdict::Unauthenticated
        };

        Ok(CallbackOutcome {
            verdict,
            redirect_url,
        })
    }

    fn is_authentic(&self, fields: &PaymentParams, signature: Option<&str>) -> Result<bool> {
        match signature {
            Some(signature) if !fields.is_empty() => {
                let canonical = signing::canonicalize(fields);
                signing::verify(&self.config.hash_secret, &canonical, signature)
            }
            _ => Ok(false),
        }
    }

    async fn settle(&self, txn_ref: &str, result: &PaymentResult) -> CallbackVerdict {
        if txn_ref.is_empty() {
            warn!("Authentic VNPay callback without a transaction reference");
            return CallbackVerdict::UnknownReference;
        }

        match self.store.settle(txn_ref, result).await {
            Ok(SettleOutcome::Applied(order)) => {
                info!(
                    txn_ref,
                    response_code = %result.response_code,
                    description = response_code::describe(&result.response_code),
                    payment_status = order.payment_status.as_str(),
                    status = order.status.as_str(),
                    "Order updated from VNPay callback"
                );
                if order.payment_status == PaymentStatus::Paid {
                    CallbackVerdict::Paid
                } else {
                    CallbackVerdict::Failed
                }
            }
            Ok(SettleOutcome::AlreadySettled(order)) => {
                info!(
                    txn_ref,
                    payment_status = order.payment_status.as_str(),
                    "Duplicate VNPay callback ignored"
                );
                CallbackVerdict::AlreadySettled
            }
            Ok(SettleOutcome::NotFound) => {
                warn!(txn_ref, "VNPay callback for unknown order");
                CallbackVerdict::UnknownReference
            }
            Err(e) => {
                error!(txn_ref, error = %e, "Failed to update order");
                CallbackVerdict::StorageFailure
            }
        }
    }

    fn redirect_url(&self, response_code: &str, txn_ref: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(params::RESPONSE_CODE, response_code)
            .append_pair(params::TXN_REF, txn_ref)
            .finish();
        format!("{}?{query}", self.config.result_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, Order, OrderStatus};
    use crate::domain::ports::OrderStore;
    use crate::domain::signing::HashSecret;
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use rust_decimal_macros::dec;

    fn config() -> GatewayConfig {
        GatewayConfig {
            tmn_code: "DEMO0001".to_string(),
            hash_secret: HashSecret::new("SECRETKEY0123456789"),
            payment_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "https://api.shop.example/payments/return".to_string(),
            frontend_url: "https://shop.example".to_string(),
            locale: "vn".to_string(),
        }
    }

    async fn verifier_with_order() -> (CallbackVerifier, InMemoryOrderStore) {
        let store = InMemoryOrderStore::new();
        store
            .insert(Order::new("o1", "ORD123", Amount::new(dec!(500000)).unwrap()))
            .await
            .unwrap();
        (CallbackVerifier::new(config(), Box::new(store.clone())), store)
    }

    fn signed_query(code: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = [
            ("vnp_Amount", "50000000"),
            ("vnp_BankCode", "NCB"),
            ("vnp_OrderInfo", "Thanh toan don hang ORD123"),
            ("vnp_PayDate", "20240309235907"),
            ("vnp_ResponseCode", code),
            ("vnp_TmnCode", "DEMO0001"),
            ("vnp_TransactionNo", "14123456"),
            ("vnp_TransactionStatus", code),
            ("vnp_TxnRef", "ORD123"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let params: PaymentParams = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let signature = signing::sign(&config().hash_secret, &signing::canonicalize(&params)).unwrap();
        pairs.push(("vnp_SecureHashType".to_string(), "HmacSHA512".to_string()));
        pairs.push(("vnp_SecureHash".to_string(), signature));
        pairs
    }

    #[tokio::test]
    async fn test_success_marks_order_paid() {
        let (verifier, store) = verifier_with_order().await;

        let outcome = verifier.handle(signed_query("00")).await.unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::Paid);
        assert_eq!(
            outcome.redirect_url,
            "https://shop.example/payment-result?vnp_ResponseCode=00&vnp_TxnRef=ORD123"
        );
        let order = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.vnpay_transaction_id.as_deref(), Some("14123456"));
    }

    #[tokio::test]
    async fn test_cancelled_payment_marks_order_failed() {
        let (verifier, store) = verifier_with_order().await;

        let outcome = verifier.handle(signed_query("24")).await.unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::Failed);
        let order = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.vnpay_transaction_id, None);
    }

    #[tokio::test]
    async fn test_forged_signature_writes_nothing() {
        let (verifier, store) = verifier_with_order().await;
        let mut query = signed_query("00");
        query.last_mut().unwrap().1 = "0".repeat(128);

        let outcome = verifier.handle(query).await.unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::Unauthenticated);
        assert!(outcome.redirect_url.contains("vnp_ResponseCode=00"));
        let order = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_tampered_amount_is_rejected() {
        let (verifier, store) = verifier_with_order().await;
        let mut query = signed_query("00");
        query[0].1 = "100".to_string();

        let outcome = verifier.handle(query).await.unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::Unauthenticated);
        let order = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_signature_writes_nothing() {
        let (verifier, store) = verifier_with_order().await;
        let query: Vec<(String, String)> = signed_query("24")
            .into_iter()
            .filter(|(k, _)| k != "vnp_SecureHash")
            .collect();

        let outcome = verifier.handle(query).await.unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::Unauthenticated);
        let order = store.find_by_number("ORD123").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_uppercase_signature_is_accepted() {
        let (verifier, _store) = verifier_with_order().await;
        let mut query = signed_query("00");
        let signature = query.last().unwrap().1.to_uppercase();
        query.last_mut().unwrap().1 = signature;

        let outcome = verifier.handle(query).await.unwrap();
        assert_eq!(outcome.verdict, CallbackVerdict::Paid);
    }

    #[tokio::test]
    async fn test_duplicate_callback_is_idempotent() {
        let (verifier, store) = verifier_with_order().await;

        verifier.handle(signed_query("00")).await.unwrap();
        let once = store.find_by_number("ORD123").await.unwrap().unwrap();
        let outcome = verifier.handle(signed_query("00")).await.unwrap();
        let twice = store.find_by_number("ORD123").await.unwrap().unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::AlreadySettled);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_unknown_reference() {
        let verifier = CallbackVerifier::new(config(), Box::new(InMemoryOrderStore::new()));

        let outcome = verifier.handle(signed_query("00")).await.unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::UnknownReference);
        assert!(outcome.redirect_url.ends_with("vnp_TxnRef=ORD123"));
    }

    #[tokio::test]
    async fn test_empty_query_redirects_with_empty_values() {
        let (verifier, _store) = verifier_with_order().await;

        let outcome = verifier
            .handle(Vec::<(String, String)>::new())
            .await
            .unwrap();

        assert_eq!(outcome.verdict, CallbackVerdict::Unauthenticated);
        assert_eq!(
            outcome.redirect_url,
            "https://shop.example/payment-result?vnp_ResponseCode=&vnp_TxnRef="
        );
    }

    #[tokio::test]
    async fn test_missing_secret_is_configuration_error() {
        let mut config = config();
        config.hash_secret = HashSecret::new("");
        let verifier = CallbackVerifier::new(config, Box::new(InMemoryOrderStore::new()));

        assert!(matches!(
            verifier.handle(signed_query("00")).await,
            Err(PaymentError::Configuration(_))
        ));
    }
}
