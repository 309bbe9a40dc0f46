//! Webhook error types.
//!
//! Each variant maps to the HTTP status the payment provider sees, which in
//! turn decides whether it redelivers the event.

use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::order::OrderError;

/// Why a signature check failed. Logged, never returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFailure {
    MissingHeader,
    MalformedHeader,
    TimestampOutOfRange,
    Mismatch,
}

impl fmt::Display for SignatureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignatureFailure::MissingHeader => "missing signature header",
            SignatureFailure::MalformedHeader => "malformed signature header",
            SignatureFailure::TimestampOutOfRange => "timestamp outside tolerance",
            SignatureFailure::Mismatch => "signature mismatch",
        };
        f.write_str(s)
    }
}

/// Errors that occur while ingesting a payment webhook.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    /// Signature header absent, malformed, stale or wrong.
    #[error("Invalid signature ({0})")]
    SignatureInvalid(SignatureFailure),

    /// Body or metadata does not match the expected schema.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The order ledger could not persist the event.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebhookError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        WebhookError::MalformedPayload(reason.into())
    }

    /// Returns true if the provider should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Storage(_))
    }

    /// Maps the error to the status code the provider receives.
    ///
    /// 4xx stops redelivery, 5xx triggers it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::SignatureInvalid(_) | WebhookError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text returned to the provider. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            WebhookError::SignatureInvalid(_) => "Invalid signature",
            WebhookError::MalformedPayload(_) => "Malformed payload",
            WebhookError::Storage(_) => "Internal error",
        }
    }
}

impl From<OrderError> for WebhookError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(e) => WebhookError::MalformedPayload(e.to_string()),
            other => WebhookError::Storage(other.to_string()),
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn signature_failures_are_bad_requests() {
        let err = WebhookError::SignatureInvalid(SignatureFailure::Mismatch);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid signature");
        assert!(!err.is_retryable());
    }

    #[test]
    fn malformed_payload_is_not_retried() {
        let err = WebhookError::malformed("missing buyerId");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Malformed payload");
        assert!(!err.is_retryable());
    }

    #[test]
    fn storage_errors_are_retried() {
        let err = WebhookError::Storage("pool timed out".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal error");
        assert!(err.is_retryable());
    }

    #[test]
    fn order_validation_becomes_malformed_payload() {
        let err: WebhookError =
            OrderError::Validation(ValidationError::empty_field("session_id")).into();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }

    #[test]
    fn displays_failure_reason() {
        let err = WebhookError::SignatureInvalid(SignatureFailure::TimestampOutOfRange);
        assert_eq!(err.to_string(), "Invalid signature (timestamp outside tolerance)");
    }
}
