//! GetOrderHandler - Query handler for reading a single order.

use std::sync::Arc;

use crate::domain::foundation::OrderId;
use crate::domain::order::{Order, OrderError};
use crate::ports::OrderRepository;

pub struct GetOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl GetOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(&order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }
}
