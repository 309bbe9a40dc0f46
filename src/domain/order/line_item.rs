//! Line items carried by an order.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// A purchased item, priced in minor currency units.
///
/// Gift add-ons share the same shape and are stored in a separate list on
/// the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Unit price in minor units (cents)
    pub price: i64,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: i64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Price times quantity, saturating instead of overflowing.
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }

    /// Rejects items that could never have been sold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::empty_field("item.id"));
        }
        if self.price < 0 {
            return Err(ValidationError::out_of_range("item.price", 0, i64::MAX, self.price));
        }
        if self.quantity == 0 {
            return Err(ValidationError::out_of_range(
                "item.quantity",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(())
    }
}
