//! Expo push gateway adapter.
//!
//! Posts a JSON array of messages and reads back `{"data": [ticket, ...]}`.
//! Non-2xx responses and transport errors are reported as gateway errors;
//! per-ticket errors are left for the caller to reconcile.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::config::PushConfig;
use crate::domain::notification::{DeliveryTicket, PushMessage};
use crate::ports::{GatewayError, GatewayErrorCode, PushGateway};

#[derive(Clone)]
pub struct ExpoPushConfig {
    endpoint: String,
    access_token: Option<Secret<String>>,
    timeout: Duration,
}

impl ExpoPushConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_push_config(config: &PushConfig) -> Self {
        let mut expo = Self::new(config.gateway_url.clone()).with_timeout(config.request_timeout());
        expo.access_token = config.access_token.clone();
        expo
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct ExpoPushGateway {
    config: ExpoPushConfig,
    client: Client,
}

impl ExpoPushGateway {
    pub fn new(config: ExpoPushConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[derive(Debug, Deserialize)]
struct ExpoResponse {
    #[serde(default)]
    data: Vec<DeliveryTicket>,
}

fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayErrorCode::AuthenticationError,
        StatusCode::TOO_MANY_REQUESTS => GatewayErrorCode::RateLimitExceeded,
        s if s.is_server_error() => GatewayErrorCode::NetworkError,
        _ => GatewayErrorCode::Rejected,
    };
    let snippet: String = body.chars().take(200).collect();
    GatewayError::new(code, format!("HTTP {}: {}", status, snippet))
}

#[async_trait]
impl PushGateway for ExpoPushGateway {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<DeliveryTicket>, GatewayError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("Accept", "application/json")
            .json(messages);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: ExpoResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;
        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_body_parses_into_tickets() {
        let body = r#"{"data":[
            {"status":"ok","id":"abc"},
            {"status":"error","message":"gone","details":{"error":"DeviceNotRegistered"}}
        ]}"#;

        let parsed: ExpoResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].id.as_deref(), Some("abc"));
    }

    #[test]
    fn missing_data_yields_no_tickets() {
        let parsed: ExpoResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
        assert!(!status_error(StatusCode::BAD_REQUEST, "").is_retryable());
    }
}
