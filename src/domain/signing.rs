//! HMAC-SHA512 signing of payment parameters.
//!
//! Both directions of the protocol go through the same three steps: build the
//! canonical string, sign it, and compare. The canonical string is the
//! `application/x-www-form-urlencoded` serialization of the parameters in
//! byte-wise key order, which is byte-identical to what the provider signs
//! (space becomes `+`, reserved bytes are percent-encoded in upper case).

use super::params::PaymentParams;
use crate::error::PaymentError;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use subtle::ConstantTimeEq;
use url::form_urlencoded;

type HmacSha512 = Hmac<Sha512>;

/// The merchant's shared HMAC secret.
///
/// `Debug` is redacted so the secret never reaches a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct HashSecret(String);

impl HashSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for HashSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashSecret(***)")
    }
}

/// Serializes the parameters into the exact byte sequence that gets signed.
pub fn canonicalize(params: &PaymentParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter() {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Computes the lowercase hex HMAC-SHA512 of `canonical` keyed by `secret`.
pub fn sign(secret: &HashSecret, canonical: &str) -> Result<String, PaymentError> {
    Ok(hex::encode(mac(secret, canonical)?))
}

/// Checks `provided_hex` against the signature of `canonical`.
///
/// Hex case is ignored. The digest comparison is constant-time; malformed hex
/// is simply a mismatch.
pub fn verify(
    secret: &HashSecret,
    canonical: &str,
    provided_hex: &str,
) -> Result<bool, PaymentError> {
    let expected = mac(secret, canonical)?;
    let Ok(provided) = hex::decode(provided_hex.trim()) else {
        return Ok(false);
    };
    Ok(bool::from(expected.as_slice().ct_eq(provided.as_slice())))
}

fn mac(secret: &HashSecret, canonical: &str) -> Result<Vec<u8>, PaymentError> {
    if secret.is_empty() {
        return Err(PaymentError::Configuration(
            "HMAC secret is empty".to_string(),
        ));
    }
    if canonical.is_empty() {
        return Err(PaymentError::Configuration(
            "Nothing to sign: parameter set is empty".to_string(),
        ));
    }

    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Configuration(format!("Invalid HMAC key: {e}")))?;
    mac.update(canonical.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
