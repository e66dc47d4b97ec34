use crate::domain::signing::HashSecret;
use crate::error::{PaymentError, Result};
use std::{env, fmt};
use tracing::info;

pub const DEFAULT_PAYMENT_URL: &str = "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html";
pub const DEFAULT_LOCALE: &str = "vn";

/// Provider credentials and the URLs both payment handlers need.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Merchant (terminal) code, `vnp_TmnCode`.
    pub tmn_code: String,
    pub hash_secret: HashSecret,
    /// Hosted checkout page the customer is redirected to.
    pub payment_url: String,
    /// Where the provider sends the customer back, `vnp_ReturnUrl`.
    pub return_url: String,
    /// Client-facing base URL; the result page lives at `/payment-result`.
    pub frontend_url: String,
    pub locale: String,
}

/// Hosted `orders` table endpoint and service credentials.
#[derive(Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"***")
            .finish()
    }
}

impl GatewayConfig {
    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            tmn_code: required(&lookup, "VNPAY_TMN_CODE")?,
            hash_secret: HashSecret::new(required(&lookup, "VNPAY_HASH_SECRET")?),
            payment_url: with_default(&lookup, "VNPAY_URL", DEFAULT_PAYMENT_URL),
            return_url: required(&lookup, "VNPAY_RETURN_URL")?,
            frontend_url: required(&lookup, "FRONTEND_URL")?,
            locale: with_default(&lookup, "VNPAY_LOCALE", DEFAULT_LOCALE),
        })
    }

    /// The client-side route the callback redirects to.
    pub fn result_page(&self) -> String {
        format!("{}/payment-result", self.frontend_url.trim_end_matches('/'))
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            base_url: required(&lookup, "SUPABASE_URL")?,
            service_key: required(&lookup, "SUPABASE_SERVICE_ROLE_KEY")?,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| PaymentError::Configuration(format!("{key} is not set")))
}

fn with_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        Some(value) => value.trim().to_string(),
        None => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}
