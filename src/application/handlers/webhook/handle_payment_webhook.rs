//! HandlePaymentWebhookHandler - Payment provider webhook intake.
//!
//! Verifies the signature, parses the event, materializes the order and
//! queues the payout and notification side effects. Side effects run later
//! on the worker pool; nothing they do can change the webhook response.

use std::sync::Arc;

use serde_json::json;

use crate::domain::foundation::{OrderId, Subject, SubjectId};
use crate::domain::notification::{Notification, NotificationCategory};
use crate::domain::webhook::{parse_event, ParsedEvent, Verification, WebhookError, WebhookVerifier};
use crate::ports::{SideEffectQueue, SideEffectTask};

use crate::application::handlers::order::{MaterializeOrderCommand, MaterializeOrderHandler};

/// What the webhook did with an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Materialized { order_id: OrderId, created: bool },
    Ignored { event_type: String },
}

pub struct HandlePaymentWebhookHandler {
    verifier: WebhookVerifier,
    materialize: Arc<MaterializeOrderHandler>,
    queue: Arc<dyn SideEffectQueue>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: WebhookVerifier,
        materialize: Arc<MaterializeOrderHandler>,
        queue: Arc<dyn SideEffectQueue>,
    ) -> Self {
        Self {
            verifier,
            materialize,
            queue,
        }
    }

    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookOutcome, WebhookError> {
        // 1. Authenticate
        match self.verifier.verify(payload, signature_header) {
            Ok(Verification::Verified) => {}
            Ok(Verification::Skipped) => {
                tracing::warn!("Webhook signature verification skipped: no secret configured");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected webhook");
                return Err(e);
            }
        }

        // 2. Parse
        let checkout = match parse_event(payload) {
            Ok(ParsedEvent::CheckoutCompleted(checkout)) => checkout,
            Ok(ParsedEvent::Ignored { event_type }) => {
                tracing::debug!(event_type = %event_type, "Ignoring webhook event");
                return Ok(WebhookOutcome::Ignored { event_type });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed webhook payload");
                return Err(e);
            }
        };

        tracing::info!(
            event_id = checkout.event_id.as_deref().unwrap_or("-"),
            session_id = %checkout.session_id,
            settled_amount = checkout.settled_amount,
            "Checkout completed"
        );

        // 3. Materialize
        let cmd = MaterializeOrderCommand::from(checkout);
        let buyer_id = cmd.buyer_id.clone();
        let payee_id = cmd.payee_id.clone();
        let settled_amount = cmd.settled_amount;

        let result = self.materialize.handle(cmd).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to materialize order");
            WebhookError::from(e)
        })?;

        // 4. Side effects only for the delivery that created the order
        if result.created {
            self.queue_side_effects(result.order_id, buyer_id, payee_id, settled_amount);
        }

        Ok(WebhookOutcome::Materialized {
            order_id: result.order_id,
            created: result.created,
        })
    }

    fn queue_side_effects(
        &self,
        order_id: OrderId,
        buyer_id: SubjectId,
        payee_id: Option<SubjectId>,
        settled_amount: i64,
    ) {
        let data = json!({ "orderId": order_id.to_string() });
        let mut tasks = Vec::with_capacity(3);

        if let Some(payee_id) = payee_id {
            if settled_amount > 0 {
                tasks.push(SideEffectTask::Payout {
                    order_id,
                    payee_id: payee_id.clone(),
                    settled_amount,
                });
            }
            tasks.push(SideEffectTask::Notify(
                Notification::new(
                    Subject::vendor(payee_id),
                    "New order",
                    "You have received a new order",
                )
                .in_category(NotificationCategory::Orders)
                .with_data(data.clone()),
            ));
        }

        tasks.push(SideEffectTask::Notify(
            Notification::new(
                Subject::buyer(buyer_id),
                "Order placed",
                "Your order has been placed",
            )
            .in_category(NotificationCategory::Orders)
            .with_data(data),
        ));

        for task in tasks {
            let kind = task.kind();
            if let Err(e) = self.queue.enqueue(task) {
                tracing::warn!(order_id = %order_id, task = kind, error = %e, "Dropped side effect");
            }
        }
    }
}
