//! Order repository port.
//!
//! Storage contract for the order ledger. Idempotency rests on a uniqueness
//! guarantee for `session_id`: implementations must resolve concurrent
//! inserts of the same session so that exactly one row wins.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::order::{Order, OrderStatus, PayoutRecord, PayoutStatus};

/// Result of attempting to insert an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// This call created the order.
    Inserted,
    /// Another order already holds the session id; carries the winner's id.
    AlreadyExists(OrderId),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Primary idempotency lookup.
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError>;

    /// Inserts a new order unless its session id is already present.
    ///
    /// A unique violation is reported as `AlreadyExists`, never as an error.
    async fn insert(&self, order: &Order) -> Result<InsertResult, DomainError>;

    /// Moves the fulfilment status from `expected` to `status`.
    ///
    /// Only the status column is written. Returns `false` without writing
    /// when the stored status is no longer `expected`.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<bool, DomainError>;

    /// Replaces the payout record if its stored status is still `expected`.
    ///
    /// Fulfilment status is left untouched. Returns `false` without writing
    /// when another writer moved the payout first.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_payout(
        &self,
        id: &OrderId,
        expected: PayoutStatus,
        payout: &PayoutRecord,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn OrderRepository) {}
    }
}
