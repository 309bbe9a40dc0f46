//! Payout error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, SubjectId, ValidationError};

/// Errors raised while splitting and transferring funds to a payee.
///
/// None of these ever reach the payment provider's webhook response.
#[derive(Debug, Clone, Error)]
pub enum PayoutError {
    /// Payee has no connected payout account yet.
    #[error("Payee {0} has not completed payout onboarding")]
    PayeeNotOnboarded(SubjectId),

    /// Payouts were switched off for the payee by an administrator.
    #[error("Payouts are disabled for payee {0}")]
    PayoutsDisabled(SubjectId),

    /// The provider rejected the transfer or could not be reached.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    #[error("Order {0} has no payee to pay out")]
    NoPayee(OrderId),

    /// A completed payout is never sent twice.
    #[error("Payout for order {0} already completed")]
    AlreadyCompleted(OrderId),

    #[error("Payout for order {0} is already in progress")]
    InProgress(OrderId),

    #[error("Invalid payout amount: {0}")]
    InvalidAmount(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PayoutError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PayoutError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            PayoutError::AlreadyCompleted(_)
            | PayoutError::InProgress(_)
            | PayoutError::NoPayee(_) => ErrorCode::Conflict,
            PayoutError::InvalidAmount(_) => ErrorCode::ValidationFailed,
            PayoutError::PayeeNotOnboarded(_)
            | PayoutError::PayoutsDisabled(_)
            | PayoutError::TransferFailed(_) => ErrorCode::ExternalServiceError,
            PayoutError::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    /// Whether the order should be marked as a failed payout.
    ///
    /// Lookup and storage problems leave the payout record untouched.
    pub fn marks_order_failed(&self) -> bool {
        matches!(
            self,
            PayoutError::PayeeNotOnboarded(_)
                | PayoutError::PayoutsDisabled(_)
                | PayoutError::TransferFailed(_)
                | PayoutError::InvalidAmount(_)
        )
    }
}

impl From<DomainError> for PayoutError {
    fn from(err: DomainError) -> Self {
        PayoutError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_errors_mark_order_failed() {
        let payee = SubjectId::new("v1").unwrap();
        assert!(PayoutError::PayeeNotOnboarded(payee.clone()).marks_order_failed());
        assert!(PayoutError::PayoutsDisabled(payee).marks_order_failed());
        assert!(PayoutError::TransferFailed("declined".into()).marks_order_failed());
    }

    #[test]
    fn storage_errors_do_not_mark_order_failed() {
        assert!(!PayoutError::Storage("down".into()).marks_order_failed());
        assert!(!PayoutError::AlreadyCompleted(OrderId::new()).marks_order_failed());
    }

    #[test]
    fn displays_payee() {
        let err = PayoutError::PayeeNotOnboarded(SubjectId::new("v9").unwrap());
        assert_eq!(err.to_string(), "Payee v9 has not completed payout onboarding");
    }
}
