//! MaterializeOrderHandler - Idempotent order creation from a completed checkout.
//!
//! The same checkout session may arrive any number of times. The first
//! arrival creates the order and counts the promo code; every later one
//! returns the existing order id without writing anything.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, SubjectId};
use crate::domain::order::{subtotal, LineItem, NewOrder, Order, OrderError, PromoCode};
use crate::domain::webhook::CompletedCheckout;
use crate::ports::{InsertResult, OrderRepository, PromoCodeRepository};

/// Command to materialize an order for a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOrderCommand {
    pub session_id: String,
    pub buyer_id: SubjectId,
    pub payee_id: Option<SubjectId>,
    pub settled_amount: i64,
    pub payment_method: Option<String>,
    pub items: Vec<LineItem>,
    pub gift_items: Vec<LineItem>,
    pub promo_code: Option<String>,
    /// Discount applied at checkout; computed from the promo code when absent
    pub promo_discount: Option<i64>,
    pub delivery_fee: Option<i64>,
}

impl From<CompletedCheckout> for MaterializeOrderCommand {
    fn from(checkout: CompletedCheckout) -> Self {
        let metadata = checkout.metadata;
        Self {
            session_id: checkout.session_id,
            buyer_id: metadata.buyer_id,
            payee_id: metadata.vendor_id,
            settled_amount: checkout.settled_amount,
            payment_method: checkout.payment_method,
            items: metadata.items,
            gift_items: metadata.gift_items,
            promo_code: metadata.promo_code,
            promo_discount: metadata.promo_discount,
            delivery_fee: metadata.delivery_fee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOrderResult {
    pub order_id: OrderId,
    /// False when the session had already been materialized
    pub created: bool,
}

pub struct MaterializeOrderHandler {
    orders: Arc<dyn OrderRepository>,
    promo_codes: Arc<dyn PromoCodeRepository>,
}

impl MaterializeOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, promo_codes: Arc<dyn PromoCodeRepository>) -> Self {
        Self {
            orders,
            promo_codes,
        }
    }

    pub async fn handle(
        &self,
        cmd: MaterializeOrderCommand,
    ) -> Result<MaterializeOrderResult, OrderError> {
        // 1. Fast path: session already recorded
        if let Some(existing) = self.orders.find_by_session_id(&cmd.session_id).await? {
            tracing::debug!(
                session_id = %cmd.session_id,
                order_id = %existing.id,
                "Checkout session already materialized"
            );
            return Ok(MaterializeOrderResult {
                order_id: existing.id,
                created: false,
            });
        }

        // 2. Resolve promo code and discount
        let promo_code = cmd.promo_code.as_deref().and_then(|raw| {
            PromoCode::normalize(raw)
                .map_err(|e| {
                    tracing::warn!(
                        session_id = %cmd.session_id,
                        promo_code = raw,
                        error = %e,
                        "Ignoring unusable promo code"
                    )
                })
                .ok()
        });
        let promo_discount = match (cmd.promo_discount, &promo_code) {
            (Some(discount), _) => discount,
            (None, Some(code)) => self.discount_for(code, &cmd.items, &cmd.gift_items).await?,
            (None, None) => 0,
        };

        // 3. Build the aggregate
        let order = Order::materialize(NewOrder {
            session_id: cmd.session_id,
            buyer_id: cmd.buyer_id,
            payee_id: cmd.payee_id,
            settled_amount: cmd.settled_amount,
            payment_method: cmd.payment_method,
            items: cmd.items,
            gift_items: cmd.gift_items,
            promo_code,
            promo_discount,
            delivery_fee: cmd.delivery_fee.unwrap_or(0),
        })?;

        // 4. Insert; the unique session id decides concurrent races
        match self.orders.insert(&order).await? {
            InsertResult::AlreadyExists(winner) => {
                tracing::info!(
                    session_id = %order.session_id,
                    order_id = %winner,
                    "Lost insert race for checkout session"
                );
                Ok(MaterializeOrderResult {
                    order_id: winner,
                    created: false,
                })
            }
            InsertResult::Inserted => {
                // 5. Count promo usage on the creation path only
                if let Some(code) = &order.promo_code {
                    self.record_promo_use(code, &order).await;
                }
                tracing::info!(
                    session_id = %order.session_id,
                    order_id = %order.id,
                    total = order.total,
                    settled_amount = order.settled_amount,
                    "Order materialized"
                );
                Ok(MaterializeOrderResult {
                    order_id: order.id,
                    created: true,
                })
            }
        }
    }

    async fn discount_for(
        &self,
        code: &str,
        items: &[LineItem],
        gifts: &[LineItem],
    ) -> Result<i64, OrderError> {
        let Some(promo) = self.promo_codes.find_by_code(code).await? else {
            tracing::warn!(promo_code = code, "Promo code not found; no discount applied");
            return Ok(0);
        };
        if promo.is_exhausted() {
            // Payment is already captured, so the order stands either way.
            tracing::warn!(promo_code = code, "Promo code used past its cap");
        }
        Ok(promo.discount_for(subtotal(items).saturating_add(subtotal(gifts))))
    }

    /// The order is already durable here, so failures are logged rather than
    /// surfaced: a retry would find the order and skip this step anyway.
    async fn record_promo_use(&self, code: &str, order: &Order) {
        match self.promo_codes.increment_usage(code).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                order_id = %order.id,
                promo_code = code,
                "Order references unknown promo code"
            ),
            Err(e) => tracing::error!(
                order_id = %order.id,
                promo_code = code,
                error = %e,
                "Failed to record promo code usage"
            ),
        }
    }
}
