//! ReconcilePayoutHandler - Manual re-run of a payout that failed, never ran,
//! or was left `Pending` by an attempt that never finished.

use std::sync::Arc;

use crate::domain::foundation::OrderId;
use crate::domain::order::PayoutStatus;
use crate::domain::payout::PayoutError;
use crate::ports::OrderRepository;

use super::{TransferPayoutCommand, TransferPayoutHandler, TransferPayoutResult};

pub struct ReconcilePayoutHandler {
    orders: Arc<dyn OrderRepository>,
    transfer: Arc<TransferPayoutHandler>,
}

impl ReconcilePayoutHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, transfer: Arc<TransferPayoutHandler>) -> Self {
        Self { orders, transfer }
    }

    pub async fn handle(&self, order_id: OrderId) -> Result<TransferPayoutResult, PayoutError> {
        let order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or(PayoutError::OrderNotFound(order_id))?;

        if order.payout.status == PayoutStatus::Completed {
            return Err(PayoutError::AlreadyCompleted(order_id));
        }
        let payee_id = order.payee_id.clone().ok_or(PayoutError::NoPayee(order_id))?;

        tracing::info!(
            order_id = %order_id,
            payout_status = %order.payout.status,
            "Reconciling payout"
        );

        self.transfer
            .handle(TransferPayoutCommand {
                order_id,
                payee_id,
                settled_amount: order.settled_amount,
            })
            .await
    }
}
