//! Platform fee rate and payout split.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const BPS_SCALE: i128 = 10_000;

/// A fee percentage expressed in basis points (1/100 of a percent).
///
/// Integer basis points keep the split exact; `1500` is 15%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u32);

impl FeeRate {
    /// Platform default when a vendor has no negotiated rate (15%).
    pub const PLATFORM_DEFAULT: Self = Self(1500);

    pub fn from_bps(bps: u32) -> Result<Self, ValidationError> {
        if bps > 10_000 {
            return Err(ValidationError::out_of_range(
                "fee_bps",
                0,
                10_000,
                i64::from(bps),
            ));
        }
        Ok(Self(bps))
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    /// Fee owed on an amount, rounded half up.
    pub fn fee_on(&self, amount: i64) -> i64 {
        let amount = i128::from(amount.max(0));
        let fee = (amount * i128::from(self.0) + BPS_SCALE / 2) / BPS_SCALE;
        fee as i64
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::PLATFORM_DEFAULT
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// How a settled amount divides between the platform and the payee.
///
/// `platform_fee + payee_amount == settled_amount` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSplit {
    pub settled_amount: i64,
    pub fee_rate: FeeRate,
    pub platform_fee: i64,
    pub payee_amount: i64,
}

impl PayoutSplit {
    pub fn compute(settled_amount: i64, fee_rate: FeeRate) -> Result<Self, ValidationError> {
        if settled_amount <= 0 {
            return Err(ValidationError::out_of_range(
                "settled_amount",
                1,
                i64::MAX,
                settled_amount,
            ));
        }
        let platform_fee = fee_rate.fee_on(settled_amount);
        Ok(Self {
            settled_amount,
            fee_rate,
            platform_fee,
            payee_amount: settled_amount - platform_fee,
        })
    }
}
