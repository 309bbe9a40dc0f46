//! Order domain module.
//!
//! The order ledger's model: line items, totals, promo codes, the fulfilment
//! lifecycle and the embedded payout record.

mod aggregate;
mod errors;
mod line_item;
mod promo_code;
mod status;
mod totals;

pub use aggregate::{NewOrder, Order, PayoutRecord};
pub use errors::OrderError;
pub use line_item::LineItem;
pub use promo_code::{DiscountType, PromoCode};
pub use status::{OrderStatus, PayoutStatus};
pub use totals::{compute_total, subtotal};
