//! Runs a single side-effect task.

use std::sync::Arc;

use crate::application::handlers::notification::DispatchNotificationHandler;
use crate::application::handlers::payout::{TransferPayoutCommand, TransferPayoutHandler};
use crate::ports::SideEffectTask;

/// Routes tasks to their handlers. Failures are logged and dropped; there is
/// no automatic retry.
pub struct SideEffectExecutor {
    payouts: Arc<TransferPayoutHandler>,
    notifications: Arc<DispatchNotificationHandler>,
}

impl SideEffectExecutor {
    pub fn new(
        payouts: Arc<TransferPayoutHandler>,
        notifications: Arc<DispatchNotificationHandler>,
    ) -> Self {
        Self {
            payouts,
            notifications,
        }
    }

    pub async fn execute(&self, task: SideEffectTask) {
        match task {
            SideEffectTask::Payout {
                order_id,
                payee_id,
                settled_amount,
            } => {
                let cmd = TransferPayoutCommand {
                    order_id,
                    payee_id,
                    settled_amount,
                };
                if let Err(e) = self.payouts.handle(cmd).await {
                    tracing::error!(
                        order_id = %order_id,
                        error_code = %e.code(),
                        error = %e,
                        "Payout task failed"
                    );
                }
            }
            SideEffectTask::Notify(notification) => {
                let recipient = notification.recipient.clone();
                if let Err(e) = self.notifications.handle(notification).await {
                    tracing::warn!(recipient = %recipient, error = %e, "Notification task failed");
                }
            }
        }
    }
}
