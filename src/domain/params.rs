use std::collections::BTreeMap;

pub const VERSION: &str = "vnp_Version";
pub const COMMAND: &str = "vnp_Command";
pub const TMN_CODE: &str = "vnp_TmnCode";
pub const LOCALE: &str = "vnp_Locale";
pub const CURR_CODE: &str = "vnp_CurrCode";
pub const TXN_REF: &str = "vnp_TxnRef";
pub const ORDER_INFO: &str = "vnp_OrderInfo";
pub const ORDER_TYPE: &str = "vnp_OrderType";
pub const AMOUNT: &str = "vnp_Amount";
pub const RETURN_URL: &str = "vnp_ReturnUrl";
pub const IP_ADDR: &str = "vnp_IpAddr";
pub const CREATE_DATE: &str = "vnp_CreateDate";
pub const EXPIRE_DATE: &str = "vnp_ExpireDate";
pub const RESPONSE_CODE: &str = "vnp_ResponseCode";
pub const TRANSACTION_NO: &str = "vnp_TransactionNo";
pub const SECURE_HASH: &str = "vnp_SecureHash";
pub const SECURE_HASH_TYPE: &str = "vnp_SecureHashType";

/// One payment transaction's parameters, excluding any signature fields.
///
/// Backed by a `BTreeMap<String, String>`, so iteration is always in
/// byte-wise ascending key order, which is the order the canonical string
/// is built in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentParams {
    fields: BTreeMap<String, String>,
}

impl PaymentParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field. Signature fields are silently dropped so they can never
    /// become part of the signed material.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if is_signature_field(&key) {
            return;
        }
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Splits decoded callback query pairs into the signed parameter set and
    /// the provided signature.
    ///
    /// A repeated key keeps its last value. Empty values are kept: the provider
    /// signs them as `key=`.
    pub fn from_query<I, K, V>(pairs: I) -> (Self, Option<String>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        let mut signature = None;
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            if key == SECURE_HASH {
                signature = Some(value);
            } else if key != SECURE_HASH_TYPE {
                params.fields.insert(key, value);
            }
        }
        (params, signature)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PaymentParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn is_signature_field(key: &str) -> bool {
    key == SECURE_HASH || key == SECURE_HASH_TYPE
}
