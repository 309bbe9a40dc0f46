//! Payment provider configuration

use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration (checkout webhooks and vendor transfers)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Provider secret API key used for transfers
    pub secret_key: Secret<String>,

    /// Webhook signing secret. When absent, signature verification is skipped.
    #[serde(default)]
    pub webhook_secret: Option<Secret<String>>,

    /// Provider API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// ISO currency code used for transfers
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Platform fee applied when a vendor has no override, in basis points
    #[serde(default = "default_platform_fee_bps")]
    pub platform_fee_bps: u32,

    /// Timeout for outbound transfer calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PaymentConfig {
    /// Creates a configuration with defaults for everything but the secrets.
    pub fn new(secret_key: impl Into<String>, webhook_secret: Option<String>) -> Self {
        Self {
            secret_key: Secret::new(secret_key.into()),
            webhook_secret: webhook_secret.map(Secret::new),
            api_base_url: default_api_base_url(),
            currency: default_currency(),
            platform_fee_bps: default_platform_fee_bps(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Check if using provider test mode
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_test_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn verifies_webhooks(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.secret_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"));
        }
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidSecretKey);
        }
        if let Some(secret) = &self.webhook_secret {
            if !secret.expose_secret().starts_with("whsec_") {
                return Err(ValidationError::InvalidWebhookSecret);
            }
        }
        if self.platform_fee_bps > 10_000 {
            return Err(ValidationError::InvalidPlatformFee);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 60 {
            return Err(ValidationError::InvalidOutboundTimeout);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_platform_fee_bps() -> u32 {
    1500
}

fn default_request_timeout() -> u64 {
    10
}
