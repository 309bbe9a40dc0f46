//! Stripe Connect transfer adapter.
//!
//! Sends `POST /v1/transfers` as a form request authenticated with the
//! secret key, passing the order's idempotency key so retries of the same
//! payout collapse into one transfer at Stripe.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::ports::{
    GatewayError, GatewayErrorCode, TransferGateway, TransferReceipt, TransferRequest,
};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Connection settings for the transfer API.
#[derive(Clone)]
pub struct StripeTransferConfig {
    secret_key: Secret<String>,
    base_url: String,
    timeout: Duration,
}

impl StripeTransferConfig {
    pub fn new(secret_key: Secret<String>) -> Self {
        Self {
            secret_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(config.secret_key.clone())
            .with_base_url(config.api_base_url.clone())
            .with_timeout(config.request_timeout())
    }

    /// Point at a different host (stripe-mock, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct StripeTransferAdapter {
    config: StripeTransferConfig,
    client: Client,
}

impl StripeTransferAdapter {
    pub fn new(config: StripeTransferConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn transfers_url(&self) -> String {
        format!("{}/v1/transfers", self.config.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct StripeTransfer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Maps a non-2xx response to a gateway error.
fn error_from_response(status: StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<StripeErrorResponse>(body)
        .ok()
        .map(|r| match (r.error.code, r.error.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => status.to_string(),
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayErrorCode::AuthenticationError,
        StatusCode::TOO_MANY_REQUESTS => GatewayErrorCode::RateLimitExceeded,
        s if s.is_server_error() => GatewayErrorCode::NetworkError,
        _ => GatewayErrorCode::Rejected,
    };
    GatewayError::new(code, detail)
}

#[async_trait]
impl TransferGateway for StripeTransferAdapter {
    async fn create_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, GatewayError> {
        let params = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("destination", request.destination.clone()),
            ("transfer_group", request.order_id.to_string()),
            ("metadata[orderId]", request.order_id.to_string()),
            ("metadata[payeeId]", request.payee_id.to_string()),
            ("metadata[platformFee]", request.platform_fee.to_string()),
        ];

        let response = self
            .client
            .post(self.transfers_url())
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_response(status, &body);
            tracing::warn!(
                order_id = %request.order_id,
                status = %status,
                error = %err,
                "Stripe transfer rejected"
            );
            return Err(err);
        }

        let transfer: StripeTransfer = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;

        Ok(TransferReceipt {
            transfer_id: transfer.id,
        })
    }
}
