//! UpdateOrderStatusHandler - Moves an order along its fulfilment lifecycle
//! and tells the buyer.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, StateMachine, Subject};
use crate::domain::notification::{Notification, NotificationCategory};
use crate::domain::order::{Order, OrderError, OrderStatus};
use crate::ports::{OrderRepository, SideEffectQueue, SideEffectTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOrderStatusCommand {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

pub struct UpdateOrderStatusHandler {
    orders: Arc<dyn OrderRepository>,
    queue: Arc<dyn SideEffectQueue>,
}

impl UpdateOrderStatusHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, queue: Arc<dyn SideEffectQueue>) -> Self {
        Self { orders, queue }
    }

    pub async fn handle(&self, cmd: UpdateOrderStatusCommand) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or(OrderError::NotFound(cmd.order_id))?;

        if !order.status.can_transition_to(&cmd.status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: cmd.status,
            });
        }
        let previous = order.status;
        order.transition_to(cmd.status)?;
        if !self
            .orders
            .update_status(&order.id, previous, order.status)
            .await?
        {
            return Err(OrderError::ConcurrentUpdate(order.id));
        }

        tracing::info!(
            order_id = %order.id,
            from = %previous,
            to = %order.status,
            "Order status updated"
        );

        let notification = status_notification(&order);
        if let Err(e) = self.queue.enqueue(SideEffectTask::Notify(notification)) {
            tracing::warn!(order_id = %order.id, error = %e, "Dropped status notification");
        }

        Ok(order)
    }
}

fn status_notification(order: &Order) -> Notification {
    let body = match order.status {
        OrderStatus::Confirmed => "Your order has been confirmed.",
        OrderStatus::Preparing => "Your order is being prepared.",
        OrderStatus::Delivering => "Your order is on its way.",
        OrderStatus::Delivered => "Your order has been delivered.",
        OrderStatus::Cancelled => "Your order has been cancelled.",
        OrderStatus::Pending => "Your order is pending.",
    };
    Notification::new(Subject::buyer(order.buyer_id.clone()), "Order update", body)
        .in_category(NotificationCategory::Orders)
        .with_data(serde_json::json!({
            "orderId": order.id.to_string(),
            "status": order.status.as_str(),
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderRepository;
    use crate::adapters::tasks::RecordingSideEffectQueue;
    use crate::domain::foundation::{DomainError, SubjectId};
    use crate::domain::order::{LineItem, NewOrder, PayoutRecord, PayoutStatus};
    use crate::ports::InsertResult;
    use async_trait::async_trait;

    async fn seeded() -> (UpdateOrderStatusHandler, InMemoryOrderRepository, RecordingSideEffectQueue, Order) {
        let orders = InMemoryOrderRepository::new();
        let queue = RecordingSideEffectQueue::new();
        let order = Order::materialize(NewOrder {
            session_id: "cs_1".into(),
            buyer_id: SubjectId::new("buyer-1").unwrap(),
            payee_id: None,
            settled_amount: 100,
            payment_method: None,
            items: vec![LineItem::new("i", "Item", 100, 1)],
            gift_items: vec![],
            promo_code: None,
            promo_discount: 0,
            delivery_fee: 0,
        })
        .unwrap();
        orders.insert(&order).await.unwrap();
        let handler = UpdateOrderStatusHandler::new(Arc::new(orders.clone()), Arc::new(queue.clone()));
        (handler, orders, queue, order)
    }

    #[tokio::test]
    async fn valid_transition_persists_and_notifies_buyer() {
        let (handler, orders, queue, order) = seeded().await;

        let updated = handler
            .handle(UpdateOrderStatusCommand {
                order_id: order.id,
                status: OrderStatus::Confirmed,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        let stored = orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);

        let tasks = queue.tasks();
        assert_eq!(tasks.len(), 1);
        let SideEffectTask::Notify(n) = &tasks[0] else {
            panic!("expected notification");
        };
        assert_eq!(n.recipient, Subject::buyer(SubjectId::new("buyer-1").unwrap()));
        assert_eq!(n.category, Some(NotificationCategory::Orders));
    }

    #[tokio::test]
    async fn invalid_transition_is_rejected_without_side_effects() {
        let (handler, _orders, queue, order) = seeded().await;

        let result = handler
            .handle(UpdateOrderStatusCommand {
                order_id: order.id,
                status: OrderStatus::Delivered,
            })
            .await;

        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert!(queue.tasks().is_empty());
    }

    /// Cancels the order in storage right after handing out the read.
    struct CancelAfterRead(InMemoryOrderRepository);

    #[async_trait]
    impl OrderRepository for CancelAfterRead {
        async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
            let read = self.0.find_by_id(id).await?;
            if let Some(order) = &read {
                self.0
                    .update_status(id, order.status, OrderStatus::Cancelled)
                    .await?;
            }
            Ok(read)
        }
        async fn find_by_session_id(&self, s: &str) -> Result<Option<Order>, DomainError> {
            self.0.find_by_session_id(s).await
        }
        async fn insert(&self, order: &Order) -> Result<InsertResult, DomainError> {
            self.0.insert(order).await
        }
        async fn update_status(
            &self,
            id: &OrderId,
            expected: OrderStatus,
            status: OrderStatus,
        ) -> Result<bool, DomainError> {
            self.0.update_status(id, expected, status).await
        }
        async fn update_payout(
            &self,
            id: &OrderId,
            expected: PayoutStatus,
            payout: &PayoutRecord,
        ) -> Result<bool, DomainError> {
            self.0.update_payout(id, expected, payout).await
        }
    }

    #[tokio::test]
    async fn status_changed_since_read_is_a_conflict() {
        let (_handler, orders, queue, order) = seeded().await;
        let handler = UpdateOrderStatusHandler::new(
            Arc::new(CancelAfterRead(orders.clone())),
            Arc::new(queue.clone()),
        );

        let result = handler
            .handle(UpdateOrderStatusCommand {
                order_id: order.id,
                status: OrderStatus::Confirmed,
            })
            .await;

        assert!(matches!(result, Err(OrderError::ConcurrentUpdate(id)) if id == order.id));
        let stored = orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert!(queue.tasks().is_empty());
    }

    #[tokio::test]
    async fn status_change_keeps_payout_record() {
        let (handler, orders, _queue, order) = seeded().await;
        let mut claimed = order.clone();
        claimed.begin_payout();
        orders
            .update_payout(&order.id, PayoutStatus::None, &claimed.payout)
            .await
            .unwrap();

        handler
            .handle(UpdateOrderStatusCommand {
                order_id: order.id,
                status: OrderStatus::Confirmed,
            })
            .await
            .unwrap();

        let stored = orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.payout.status, PayoutStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (handler, _orders, _queue, _order) = seeded().await;

        let result = handler
            .handle(UpdateOrderStatusCommand {
                order_id: OrderId::new(),
                status: OrderStatus::Confirmed,
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }
}
