//! Order total computation.

use super::LineItem;

/// Computes the amount owed for an order.
///
/// `max(0, Σ item + Σ gift − discount + delivery_fee)`, all in minor units.
pub fn compute_total(
    items: &[LineItem],
    gifts: &[LineItem],
    discount: i64,
    delivery_fee: i64,
) -> i64 {
    let subtotal = subtotal(items).saturating_add(subtotal(gifts));
    subtotal
        .saturating_sub(discount)
        .saturating_add(delivery_fee)
        .max(0)
}

/// Sum of line totals.
pub fn subtotal(items: &[LineItem]) -> i64 {
    items
        .iter()
        .fold(0i64, |acc, item| acc.saturating_add(item.line_total()))
}
