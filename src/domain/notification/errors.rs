//! Notification error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// Gateway returned non-2xx, timed out or sent an unreadable body.
    #[error("Push gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Notification {0} not found")]
    NotFound(NotificationId),

    #[error("Invalid notification request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl NotificationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NotificationError::GatewayUnavailable(_) => ErrorCode::ExternalServiceError,
            NotificationError::NotFound(_) => ErrorCode::NotFound,
            NotificationError::Validation(_) => ErrorCode::ValidationFailed,
            NotificationError::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for NotificationError {
    fn from(err: DomainError) -> Self {
        NotificationError::Storage(err.to_string())
    }
}
