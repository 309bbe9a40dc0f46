//! Order aggregate entity.
//!
//! An Order is the durable record of one completed checkout session. It is
//! created exactly once per provider session id and never deleted.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: all amounts are i64 cents
//! - **Idempotent creation**: `session_id` is unique at the storage level
//! - **Payout embedded**: the payout outcome lives on the order, separate from
//!   the fulfilment `status`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    OrderId, StateMachine, SubjectId, Timestamp, ValidationError,
};
use crate::domain::payout::PayoutSplit;

use super::{compute_total, LineItem, OrderStatus, PayoutStatus, PromoCode};

/// Outcome of moving the settled funds to the payee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub status: PayoutStatus,
    pub platform_fee: Option<i64>,
    pub payee_amount: Option<i64>,
    /// Provider transfer id, present once completed
    pub transfer_id: Option<String>,
    pub failure_reason: Option<String>,
    pub attempted_at: Option<Timestamp>,
}

/// Everything needed to materialize an order from a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub session_id: String,
    pub buyer_id: SubjectId,
    pub payee_id: Option<SubjectId>,
    /// Amount the provider actually captured
    pub settled_amount: i64,
    /// Provider payment-intent id
    pub payment_method: Option<String>,
    pub items: Vec<LineItem>,
    pub gift_items: Vec<LineItem>,
    pub promo_code: Option<String>,
    pub promo_discount: i64,
    pub delivery_fee: i64,
}

/// Order aggregate.
///
/// # Invariants
///
/// - `session_id` is unique across all orders
/// - `total == max(0, Σ items + Σ gifts − promo_discount + delivery_fee)`
/// - once `payout.status` is completed, `platform_fee + payee_amount == settled_amount`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub session_id: String,
    pub buyer_id: SubjectId,
    pub payee_id: Option<SubjectId>,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub gift_items: Vec<LineItem>,
    pub promo_code: Option<String>,
    pub promo_discount: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub settled_amount: i64,
    pub payment_method: Option<String>,
    pub payout: PayoutRecord,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Builds a pending order from checkout data.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank session id, negative amounts,
    /// malformed line items or an unusable promo code.
    pub fn materialize(new: NewOrder) -> Result<Self, ValidationError> {
        let session_id = new.session_id.trim().to_string();
        if session_id.is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        for (field, value) in [
            ("settled_amount", new.settled_amount),
            ("promo_discount", new.promo_discount),
            ("delivery_fee", new.delivery_fee),
        ] {
            if value < 0 {
                return Err(ValidationError::out_of_range(field, 0, i64::MAX, value));
            }
        }
        for item in new.items.iter().chain(new.gift_items.iter()) {
            item.validate()?;
        }
        let promo_code = new
            .promo_code
            .as_deref()
            .map(PromoCode::normalize)
            .transpose()?;

        let total = compute_total(
            &new.items,
            &new.gift_items,
            new.promo_discount,
            new.delivery_fee,
        );
        let now = Timestamp::now();

        Ok(Self {
            id: OrderId::new(),
            session_id,
            buyer_id: new.buyer_id,
            payee_id: new.payee_id,
            status: OrderStatus::Pending,
            items: new.items,
            gift_items: new.gift_items,
            promo_code,
            promo_discount: new.promo_discount,
            delivery_fee: new.delivery_fee,
            total,
            settled_amount: new.settled_amount,
            payment_method: new.payment_method,
            payout: PayoutRecord::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Moves the order along its fulfilment lifecycle.
    pub fn transition_to(&mut self, target: OrderStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// True when a payout may be attempted at `now`.
    ///
    /// An attempt still `Pending` after `stale_after` is treated as abandoned
    /// and may be taken over. Retries reuse the order's idempotency key.
    pub fn payout_is_settleable(&self, now: Timestamp, stale_after: Duration) -> bool {
        match self.payout.status {
            PayoutStatus::None | PayoutStatus::Failed => true,
            PayoutStatus::Completed => false,
            PayoutStatus::Pending => match self.payout.attempted_at {
                Some(attempted) => {
                    u64::try_from(now.as_unix_secs() - attempted.as_unix_secs())
                        .map_or(false, |age| age >= stale_after.as_secs())
                }
                None => true,
            },
        }
    }

    /// Marks a payout attempt as in flight.
    pub fn begin_payout(&mut self) {
        let now = Timestamp::now();
        self.payout.status = PayoutStatus::Pending;
        self.payout.failure_reason = None;
        self.payout.attempted_at = Some(now);
        self.updated_at = now;
    }

    /// Records a successful transfer.
    pub fn complete_payout(&mut self, split: &PayoutSplit, transfer_id: impl Into<String>) {
        self.payout.status = PayoutStatus::Completed;
        self.payout.platform_fee = Some(split.platform_fee);
        self.payout.payee_amount = Some(split.payee_amount);
        self.payout.transfer_id = Some(transfer_id.into());
        self.payout.failure_reason = None;
        self.updated_at = Timestamp::now();
    }

    /// Records a failed transfer. The fulfilment status is left alone.
    pub fn fail_payout(&mut self, reason: impl Into<String>) {
        self.payout.status = PayoutStatus::Failed;
        self.payout.failure_reason = Some(reason.into());
        self.updated_at = Timestamp::now();
    }
}
