//! Push gateway configuration

use std::time::Duration;

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;

/// Push notification gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Batch send endpoint of the push gateway
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Optional bearer token for gateways that enforce access tokens
    #[serde(default)]
    pub access_token: Option<Secret<String>>,

    /// Timeout for a batch send
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PushConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate push configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.gateway_url.starts_with("https://") && !self.gateway_url.starts_with("http://") {
            return Err(ValidationError::InvalidPushGatewayUrl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 60 {
            return Err(ValidationError::InvalidOutboundTimeout);
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            access_token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
