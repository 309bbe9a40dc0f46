//! In-memory order repository.
//!
//! Used for tests and for running without a database in development. The
//! session-id check and the insert happen under one write lock, which gives
//! the same single-winner guarantee as the unique index in Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp};
use crate::domain::order::{Order, OrderStatus, PayoutRecord, PayoutStatus};
use crate::ports::{InsertResult, OrderRepository};

#[derive(Default)]
struct OrderTable {
    orders: HashMap<OrderId, Order>,
    by_session: HashMap<String, OrderId>,
}

#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    table: Arc<RwLock<OrderTable>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.table.read().await.orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.table.read().await.orders.get(id).cloned())
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .by_session
            .get(session_id)
            .and_then(|id| table.orders.get(id))
            .cloned())
    }

    async fn insert(&self, order: &Order) -> Result<InsertResult, DomainError> {
        let mut table = self.table.write().await;
        if let Some(existing) = table.by_session.get(&order.session_id) {
            return Ok(InsertResult::AlreadyExists(*existing));
        }
        table.by_session.insert(order.session_id.clone(), order.id);
        table.orders.insert(order.id, order.clone());
        Ok(InsertResult::Inserted)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        let slot = table.orders.get_mut(id).ok_or_else(|| not_found(id))?;
        if slot.status != expected {
            return Ok(false);
        }
        slot.status = status;
        slot.updated_at = Timestamp::now();
        Ok(true)
    }

    async fn update_payout(
        &self,
        id: &OrderId,
        expected: PayoutStatus,
        payout: &PayoutRecord,
    ) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        let slot = table.orders.get_mut(id).ok_or_else(|| not_found(id))?;
        if slot.payout.status != expected {
            return Ok(false);
        }
        slot.payout = payout.clone();
        slot.updated_at = Timestamp::now();
        Ok(true)
    }
}

fn not_found(id: &OrderId) -> DomainError {
    DomainError::new(ErrorCode::OrderNotFound, format!("Order {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubjectId;
    use crate::domain::order::{LineItem, NewOrder};

    fn order(session: &str) -> Order {
        Order::materialize(NewOrder {
            session_id: session.to_string(),
            buyer_id: SubjectId::new("b1").unwrap(),
            payee_id: None,
            settled_amount: 100,
            payment_method: None,
            items: vec![LineItem::new("i", "Item", 100, 1)],
            gift_items: vec![],
            promo_code: None,
            promo_discount: 0,
            delivery_fee: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn second_insert_for_session_reports_winner() {
        let repo = InMemoryOrderRepository::new();
        let first = order("cs_1");
        let second = order("cs_1");

        assert_eq!(repo.insert(&first).await.unwrap(), InsertResult::Inserted);
        assert_eq!(
            repo.insert(&second).await.unwrap(),
            InsertResult::AlreadyExists(first.id)
        );
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_have_single_winner() {
        let repo = InMemoryOrderRepository::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.insert(&order("cs_race")).await }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == InsertResult::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn update_of_unknown_order_fails() {
        let repo = InMemoryOrderRepository::new();
        let err = repo
            .update_status(&OrderId::new(), OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn status_write_requires_expected_status() {
        let repo = InMemoryOrderRepository::new();
        let o = order("cs_cas");
        repo.insert(&o).await.unwrap();

        assert!(repo
            .update_status(&o.id, OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap());
        assert!(!repo
            .update_status(&o.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap());

        let stored = repo.find_by_id(&o.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn payout_write_leaves_status_alone() {
        let repo = InMemoryOrderRepository::new();
        let mut o = order("cs_split");
        repo.insert(&o).await.unwrap();
        repo.update_status(&o.id, OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap();

        // Snapshot still reads Pending; only the payout columns may land.
        o.begin_payout();
        assert!(repo
            .update_payout(&o.id, PayoutStatus::None, &o.payout)
            .await
            .unwrap());

        let stored = repo.find_by_id(&o.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.payout.status, PayoutStatus::Pending);
    }

    #[tokio::test]
    async fn payout_write_loses_to_earlier_claim() {
        let repo = InMemoryOrderRepository::new();
        let mut o = order("cs_claim");
        repo.insert(&o).await.unwrap();
        o.begin_payout();

        assert!(repo.update_payout(&o.id, PayoutStatus::None, &o.payout).await.unwrap());
        assert!(!repo.update_payout(&o.id, PayoutStatus::None, &o.payout).await.unwrap());
    }

    #[tokio::test]
    async fn find_by_session_returns_inserted_order() {
        let repo = InMemoryOrderRepository::new();
        let o = order("cs_2");
        repo.insert(&o).await.unwrap();

        let found = repo.find_by_session_id("cs_2").await.unwrap().unwrap();
        assert_eq!(found.id, o.id);
        assert!(repo.find_by_session_id("cs_3").await.unwrap().is_none());
    }
}
