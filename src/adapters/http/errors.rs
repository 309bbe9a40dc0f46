//! Error-to-response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::foundation::ValidationError;
use crate::domain::notification::NotificationError;
use crate::domain::order::OrderError;
use crate::domain::payout::PayoutError;
use crate::domain::webhook::WebhookError;

use super::dto::ErrorResponse;

/// Error returned by the internal JSON endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl ToString, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code.to_string(), message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = %self.body.code, message = %self.body.message, "Request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let status = match &err {
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::InvalidTransition { .. } | OrderError::ConcurrentUpdate(_) => {
                StatusCode::CONFLICT
            }
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        let status = match &err {
            PayoutError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            PayoutError::AlreadyCompleted(_)
            | PayoutError::InProgress(_)
            | PayoutError::NoPayee(_) => StatusCode::CONFLICT,
            PayoutError::PayeeNotOnboarded(_)
            | PayoutError::PayoutsDisabled(_)
            | PayoutError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PayoutError::TransferFailed(_) => StatusCode::BAD_GATEWAY,
            PayoutError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        let status = match &err {
            NotificationError::NotFound(_) => StatusCode::NOT_FOUND,
            NotificationError::Validation(_) => StatusCode::BAD_REQUEST,
            NotificationError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            NotificationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

/// Webhook failures use the provider-facing `{"error": ...}` body and never
/// leak internal detail.
#[derive(Debug)]
pub struct WebhookRejection(pub WebhookError);

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}
