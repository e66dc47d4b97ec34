#![allow(dead_code)]

use rust_decimal_macros::dec;
use vnpay_gateway::config::GatewayConfig;
use vnpay_gateway::domain::order::{Amount, Order};
use vnpay_gateway::domain::params::PaymentParams;
use vnpay_gateway::domain::ports::OrderStore;
use vnpay_gateway::domain::signing::{self, HashSecret};
use vnpay_gateway::infrastructure::in_memory::InMemoryOrderStore;

pub const SECRET: &str = "SECRETKEY0123456789";

pub fn config() -> GatewayConfig {
    GatewayConfig {
        tmn_code: "DEMO0001".to_string(),
        hash_secret: HashSecret::new(SECRET),
        payment_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
        return_url: "https://api.shop.example/payments/return".to_string(),
        frontend_url: "https://shop.example".to_string(),
        locale: "vn".to_string(),
    }
}

pub async fn seeded_store() -> InMemoryOrderStore {
    let store = InMemoryOrderStore::new();
    store
        .insert(Order::new("o1", "ORD123", Amount::new(dec!(500000)).unwrap()))
        .await
        .unwrap();
    store
}

/// Builds the query a provider would send back for `txn_ref`, signed with `SECRET`.
pub fn provider_callback(txn_ref: &str, response_code: &str) -> Vec<(String, String)> {
    provider_callback_with(txn_ref, response_code, &[])
}

/// Like `provider_callback`, with extra fields included in the signed material.
pub fn provider_callback_with(
    txn_ref: &str,
    response_code: &str,
    extra: &[(&str, &str)],
) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = [
        ("vnp_Amount", "50000000"),
        ("vnp_BankCode", "NCB"),
        ("vnp_BankTranNo", "VNP14123456"),
        ("vnp_CardType", "ATM"),
        ("vnp_OrderInfo", "Thanh toan don hang ORD123"),
        ("vnp_PayDate", "20240309235907"),
        ("vnp_ResponseCode", response_code),
        ("vnp_TmnCode", "DEMO0001"),
        ("vnp_TransactionNo", "14123456"),
        ("vnp_TransactionStatus", response_code),
        ("vnp_TxnRef", txn_ref),
    ]
    .iter()
    .chain(extra)
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let params: PaymentParams = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let signature = signing::sign(&HashSecret::new(SECRET), &signing::canonicalize(&params)).unwrap();
    pairs.push(("vnp_SecureHashType".to_string(), "HmacSHA512".to_string()));
    pairs.push(("vnp_SecureHash".to_string(), signature));
    pairs
}

pub fn to_query_string(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
