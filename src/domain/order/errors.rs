//! Order ledger error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, ValidationError};

use super::OrderStatus;

/// Errors raised by the order ledger.
///
/// A duplicate session is not an error: materialization returns the
/// existing order instead.
#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(OrderId),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Another writer moved the order between read and write.
    #[error("Order {0} was changed concurrently")]
    ConcurrentUpdate(OrderId),

    #[error("Invalid order: {0}")]
    Validation(#[from] ValidationError),

    /// Storage was unreachable or rejected the write.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::NotFound(_) => ErrorCode::OrderNotFound,
            OrderError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            OrderError::ConcurrentUpdate(_) => ErrorCode::Conflict,
            OrderError::Validation(_) => ErrorCode::ValidationFailed,
            OrderError::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => {
                OrderError::Validation(ValidationError::invalid_format("order", err.message))
            }
            _ => OrderError::Storage(err.to_string()),
        }
    }
}
