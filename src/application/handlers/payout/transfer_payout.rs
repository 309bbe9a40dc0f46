//! TransferPayoutHandler - Splits a settled order and pays the vendor.
//!
//! Runs off the request path. Every failure is recorded on the order's
//! payout record and never touches the order's fulfilment status.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{OrderId, SubjectId, Timestamp};
use crate::domain::order::{Order, PayoutStatus};
use crate::domain::payout::{FeeRate, PayoutError, PayoutSplit};
use crate::ports::{OrderRepository, PayeeDirectory, TransferGateway, TransferRequest};

/// Platform-wide payout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutSettings {
    pub default_fee: FeeRate,
    pub currency: String,
    /// Age after which a `Pending` attempt is considered abandoned.
    pub stale_after: Duration,
}

impl Default for PayoutSettings {
    fn default() -> Self {
        Self {
            default_fee: FeeRate::PLATFORM_DEFAULT,
            currency: "usd".to_string(),
            stale_after: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayoutCommand {
    pub order_id: OrderId,
    pub payee_id: SubjectId,
    pub settled_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayoutResult {
    pub transfer_id: String,
    pub payee_amount: i64,
    pub platform_fee: i64,
}

pub struct TransferPayoutHandler {
    orders: Arc<dyn OrderRepository>,
    payees: Arc<dyn PayeeDirectory>,
    gateway: Arc<dyn TransferGateway>,
    settings: PayoutSettings,
}

impl TransferPayoutHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payees: Arc<dyn PayeeDirectory>,
        gateway: Arc<dyn TransferGateway>,
        settings: PayoutSettings,
    ) -> Self {
        Self {
            orders,
            payees,
            gateway,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: TransferPayoutCommand,
    ) -> Result<TransferPayoutResult, PayoutError> {
        // 1. Load order and make sure it has not been paid already
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or(PayoutError::OrderNotFound(cmd.order_id))?;

        if order.payout.status == PayoutStatus::Completed {
            return Err(PayoutError::AlreadyCompleted(order.id));
        }
        if !order.payout_is_settleable(Timestamp::now(), self.settings.stale_after) {
            return Err(PayoutError::InProgress(order.id));
        }

        // 2. Resolve payee account and fee
        let (destination, fee) = match self.resolve_payee(&cmd.payee_id).await {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.record_failure(&mut order, err).await),
        };

        // 3. Compute split
        let split = match PayoutSplit::compute(cmd.settled_amount, fee) {
            Ok(split) => split,
            Err(e) => return Err(self.record_failure(&mut order, e.into()).await),
        };

        // 4. Claim the payout, then call the provider
        let claimed_from = order.payout.status;
        order.begin_payout();
        if !self
            .orders
            .update_payout(&order.id, claimed_from, &order.payout)
            .await?
        {
            return Err(PayoutError::InProgress(order.id));
        }

        let request = TransferRequest {
            amount: split.payee_amount,
            currency: self.settings.currency.clone(),
            destination,
            order_id: order.id,
            payee_id: cmd.payee_id.clone(),
            platform_fee: split.platform_fee,
            idempotency_key: TransferRequest::idempotency_key_for(&order.id),
        };

        let receipt = match self.gateway.create_transfer(request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                let err = PayoutError::TransferFailed(e.to_string());
                return Err(self.record_failure(&mut order, err).await);
            }
        };

        // 5. Record success
        order.complete_payout(&split, receipt.transfer_id.clone());
        if !self
            .orders
            .update_payout(&order.id, PayoutStatus::Pending, &order.payout)
            .await?
        {
            // Transfer went through regardless; keep the receipt in the log
            tracing::warn!(
                order_id = %order.id,
                transfer_id = %receipt.transfer_id,
                "Payout record changed during transfer"
            );
        }

        tracing::info!(
            order_id = %order.id,
            payee_id = %cmd.payee_id,
            transfer_id = %receipt.transfer_id,
            payee_amount = split.payee_amount,
            platform_fee = split.platform_fee,
            "Payout completed"
        );

        Ok(TransferPayoutResult {
            transfer_id: receipt.transfer_id,
            payee_amount: split.payee_amount,
            platform_fee: split.platform_fee,
        })
    }

    async fn resolve_payee(&self, payee_id: &SubjectId) -> Result<(String, FeeRate), PayoutError> {
        let account = self
            .payees
            .find_payee(payee_id)
            .await?
            .ok_or_else(|| PayoutError::PayeeNotOnboarded(payee_id.clone()))?;

        let destination = account
            .payout_account_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PayoutError::PayeeNotOnboarded(payee_id.clone()))?;

        if !account.payouts_enabled {
            return Err(PayoutError::PayoutsDisabled(payee_id.clone()));
        }

        Ok((destination, account.fee_rate(self.settings.default_fee)))
    }

    /// Writes the failure to the order when it belongs there and hands the
    /// error back for the caller to return.
    async fn record_failure(&self, order: &mut Order, err: PayoutError) -> PayoutError {
        tracing::warn!(order_id = %order.id, error = %err, "Payout failed");
        if !err.marks_order_failed() {
            return err;
        }
        let expected = order.payout.status;
        order.fail_payout(err.to_string());
        match self.orders.update_payout(&order.id, expected, &order.payout).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                order_id = %order.id,
                "Payout record changed before failure was recorded"
            ),
            Err(e) => tracing::error!(
                order_id = %order.id,
                error = %e,
                "Failed to record payout failure"
            ),
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryOrderRepository, InMemoryPayeeDirectory};
    use crate::adapters::stripe::MockTransferGateway;
    use crate::domain::order::{LineItem, NewOrder, OrderStatus};
    use crate::domain::payout::PayeeAccount;
    use crate::ports::{GatewayError, TransferReceipt};
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    fn vendor() -> SubjectId {
        SubjectId::new("vendor-1").unwrap()
    }

    struct Setup {
        handler: TransferPayoutHandler,
        orders: InMemoryOrderRepository,
        payees: InMemoryPayeeDirectory,
        gateway: MockTransferGateway,
        order: Order,
    }

    async fn setup_with(gateway: MockTransferGateway) -> Setup {
        let orders = InMemoryOrderRepository::new();
        let payees = InMemoryPayeeDirectory::new();
        let order = Order::materialize(NewOrder {
            session_id: "cs_1".into(),
            buyer_id: SubjectId::new("buyer-1").unwrap(),
            payee_id: Some(vendor()),
            settled_amount: 1000,
            payment_method: Some("pi_1".into()),
            items: vec![LineItem::new("i", "Cake", 1000, 1)],
            gift_items: vec![],
            promo_code: None,
            promo_discount: 0,
            delivery_fee: 0,
        })
        .unwrap();
        orders.insert(&order).await.unwrap();

        let handler = TransferPayoutHandler::new(
            Arc::new(orders.clone()),
            Arc::new(payees.clone()),
            Arc::new(gateway.clone()),
            PayoutSettings::default(),
        );
        Setup {
            handler,
            orders,
            payees,
            gateway,
            order,
        }
    }

    async fn setup() -> Setup {
        setup_with(MockTransferGateway::new()).await
    }

    fn command(order: &Order) -> TransferPayoutCommand {
        TransferPayoutCommand {
            order_id: order.id,
            payee_id: vendor(),
            settled_amount: order.settled_amount,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn pays_vendor_net_of_default_fee() {
        let s = setup().await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;

        let result = s.handler.handle(command(&s.order)).await.unwrap();

        assert_eq!(result.platform_fee, 150);
        assert_eq!(result.payee_amount, 850);

        let requests = s.gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount, 850);
        assert_eq!(requests[0].destination, "acct_1");
        assert_eq!(requests[0].idempotency_key, format!("payout-{}", s.order.id));

        let stored = s.orders.find_by_id(&s.order.id).await.unwrap().unwrap();
        assert_eq!(stored.payout.status, PayoutStatus::Completed);
        assert_eq!(stored.payout.transfer_id.as_deref(), Some(result.transfer_id.as_str()));
        assert_eq!(stored.payout.platform_fee, Some(150));
        assert_eq!(stored.payout.payee_amount, Some(850));
    }

    #[tokio::test]
    async fn negotiated_fee_overrides_default() {
        let s = setup().await;
        s.payees
            .add(PayeeAccount::onboarded(vendor(), "acct_1").with_fee(FeeRate::from_bps(1000).unwrap()))
            .await;

        let result = s.handler.handle(command(&s.order)).await.unwrap();

        assert_eq!(result.platform_fee, 100);
        assert_eq!(result.payee_amount, 900);
    }

    /// Confirms the order while the transfer is in flight.
    struct ConfirmsDuringTransfer {
        orders: InMemoryOrderRepository,
        inner: MockTransferGateway,
    }

    #[async_trait]
    impl TransferGateway for ConfirmsDuringTransfer {
        async fn create_transfer(
            &self,
            request: TransferRequest,
        ) -> Result<TransferReceipt, GatewayError> {
            self.orders
                .update_status(&request.order_id, OrderStatus::Pending, OrderStatus::Confirmed)
                .await
                .unwrap();
            self.inner.create_transfer(request).await
        }
    }

    #[tokio::test]
    async fn status_change_during_transfer_is_kept() {
        let s = setup().await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;
        let handler = TransferPayoutHandler::new(
            Arc::new(s.orders.clone()),
            Arc::new(s.payees.clone()),
            Arc::new(ConfirmsDuringTransfer {
                orders: s.orders.clone(),
                inner: s.gateway.clone(),
            }),
            PayoutSettings::default(),
        );

        handler.handle(command(&s.order)).await.unwrap();

        let stored = s.orders.find_by_id(&s.order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.payout.status, PayoutStatus::Completed);
    }

    #[tokio::test]
    async fn fresh_pending_payout_is_in_progress() {
        let s = setup().await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;
        let mut claimed = s.order.clone();
        claimed.begin_payout();
        s.orders
            .update_payout(&s.order.id, PayoutStatus::None, &claimed.payout)
            .await
            .unwrap();

        let result = s.handler.handle(command(&s.order)).await;

        assert!(matches!(result, Err(PayoutError::InProgress(_))));
        assert_eq!(s.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn abandoned_pending_payout_is_taken_over() {
        let s = setup().await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;
        let mut abandoned = s.order.clone();
        abandoned.begin_payout();
        abandoned.payout.attempted_at = Some(Timestamp::now().minus_secs(3600));
        s.orders
            .update_payout(&s.order.id, PayoutStatus::None, &abandoned.payout)
            .await
            .unwrap();

        let result = s.handler.handle(command(&s.order)).await.unwrap();

        assert_eq!(result.payee_amount, 850);
        assert_eq!(
            s.gateway.requests()[0].idempotency_key,
            TransferRequest::idempotency_key_for(&s.order.id)
        );
        let stored = s.orders.find_by_id(&s.order.id).await.unwrap().unwrap();
        assert_eq!(stored.payout.status, PayoutStatus::Completed);
    }

    #[tokio::test]
    async fn completed_payout_is_never_sent_twice() {
        let s = setup().await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;
        s.handler.handle(command(&s.order)).await.unwrap();

        let second = s.handler.handle(command(&s.order)).await;

        assert!(matches!(second, Err(PayoutError::AlreadyCompleted(_))));
        assert_eq!(s.gateway.call_count(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failures
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_payee_marks_payout_failed() {
        let s = setup().await;

        let result = s.handler.handle(command(&s.order)).await;

        assert!(matches!(result, Err(PayoutError::PayeeNotOnboarded(_))));
        assert_eq!(s.gateway.call_count(), 0);
        let stored = s.orders.find_by_id(&s.order.id).await.unwrap().unwrap();
        assert_eq!(stored.payout.status, PayoutStatus::Failed);
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn payee_without_account_is_not_onboarded() {
        let s = setup().await;
        let mut account = PayeeAccount::onboarded(vendor(), "acct_1");
        account.payout_account_id = None;
        s.payees.add(account).await;

        let result = s.handler.handle(command(&s.order)).await;

        assert!(matches!(result, Err(PayoutError::PayeeNotOnboarded(_))));
    }

    #[tokio::test]
    async fn disabled_payouts_are_refused() {
        let s = setup().await;
        s.payees
            .add(PayeeAccount::onboarded(vendor(), "acct_1").with_payouts_enabled(false))
            .await;

        let result = s.handler.handle(command(&s.order)).await;

        assert!(matches!(result, Err(PayoutError::PayoutsDisabled(_))));
        assert_eq!(s.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_rejection_keeps_order_status() {
        let s = setup_with(MockTransferGateway::failing(GatewayError::rejected(
            "insufficient platform balance",
        )))
        .await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;

        let result = s.handler.handle(command(&s.order)).await;

        assert!(matches!(result, Err(PayoutError::TransferFailed(_))));
        let stored = s.orders.find_by_id(&s.order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.payout.status, PayoutStatus::Failed);
        assert!(stored
            .payout
            .failure_reason
            .unwrap()
            .contains("insufficient platform balance"));
        assert!(stored.payout.transfer_id.is_none());
    }

    #[tokio::test]
    async fn failed_payout_can_be_retried() {
        let s = setup().await;
        s.payees.add(PayeeAccount::onboarded(vendor(), "acct_1")).await;
        s.gateway.fail_next(GatewayError::timeout("deadline elapsed"));

        assert!(s.handler.handle(command(&s.order)).await.is_err());
        let retry = s.handler.handle(command(&s.order)).await.unwrap();

        assert_eq!(retry.payee_amount, 850);
        let requests = s.gateway.requests();
        assert_eq!(requests[0].idempotency_key, requests[1].idempotency_key);
    }

    #[tokio::test]
    async fn unknown_order_is_reported() {
        let s = setup().await;
        let cmd = TransferPayoutCommand {
            order_id: OrderId::new(),
            payee_id: vendor(),
            settled_amount: 100,
        };

        assert!(matches!(
            s.handler.handle(cmd).await,
            Err(PayoutError::OrderNotFound(_))
        ));
    }
}
