//! Promo code value object.
//!
//! Codes are compared case-insensitively and stored upper case. The usage
//! counter is owned by the order ledger: it moves only when an order that
//! references the code is created for the first time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How a promo code reduces the order subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Fixed amount in minor units
    Fixed,
    /// Whole percent of the subtotal
    Percent,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Fixed => "fixed",
            DiscountType::Percent => "percent",
        }
    }
}

impl FromStr for DiscountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(DiscountType::Fixed),
            "percent" | "percentage" => Ok(DiscountType::Percent),
            other => Err(ValidationError::invalid_format(
                "discount_type",
                format!("unknown discount type '{}'", other),
            )),
        }
    }
}

/// A promotional code with its usage bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    /// Maximum number of orders allowed to use the code, if capped
    pub usage_cap: Option<u32>,
    pub usage_count: u32,
}

impl PromoCode {
    pub fn new(
        code: &str,
        discount_type: DiscountType,
        discount_value: i64,
        usage_cap: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let code = Self::normalize(code)?;
        if discount_value < 0 {
            return Err(ValidationError::out_of_range(
                "discount_value",
                0,
                i64::MAX,
                discount_value,
            ));
        }
        if discount_type == DiscountType::Percent && discount_value > 100 {
            return Err(ValidationError::out_of_range(
                "discount_value",
                0,
                100,
                discount_value,
            ));
        }
        Ok(Self {
            code,
            discount_type,
            discount_value,
            usage_cap,
            usage_count: 0,
        })
    }

    /// Canonical storage form of a code.
    pub fn normalize(code: &str) -> Result<String, ValidationError> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("promo_code"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "promo_code",
                "alphanumeric characters, '-' and '_' only",
            ));
        }
        Ok(trimmed.to_uppercase())
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_cap
            .map(|cap| self.usage_count >= cap)
            .unwrap_or(false)
    }

    /// Discount this code grants against a subtotal, never more than the subtotal.
    pub fn discount_for(&self, subtotal: i64) -> i64 {
        let subtotal = subtotal.max(0);
        let discount = match self.discount_type {
            DiscountType::Fixed => self.discount_value,
            DiscountType::Percent => (subtotal.saturating_mul(self.discount_value) + 50) / 100,
        };
        discount.min(subtotal)
    }
}

impl fmt::Display for PromoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
