//! Payee account as seen by the payout splitter.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::SubjectId;

use super::FeeRate;

/// Payout settings of a vendor.
///
/// Owned by the vendor onboarding flow; the settlement pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeAccount {
    pub payee_id: SubjectId,
    /// Connected account at the payment provider, set once onboarding completes
    pub payout_account_id: Option<String>,
    /// Negotiated fee, overriding the platform default
    pub fee_override: Option<FeeRate>,
    /// Administrative kill switch for payouts
    pub payouts_enabled: bool,
}

impl PayeeAccount {
    /// A fully onboarded payee on the default fee.
    pub fn onboarded(payee_id: SubjectId, payout_account_id: impl Into<String>) -> Self {
        Self {
            payee_id,
            payout_account_id: Some(payout_account_id.into()),
            fee_override: None,
            payouts_enabled: true,
        }
    }

    pub fn with_fee(mut self, fee: FeeRate) -> Self {
        self.fee_override = Some(fee);
        self
    }

    pub fn with_payouts_enabled(mut self, enabled: bool) -> Self {
        self.payouts_enabled = enabled;
        self
    }

    pub fn fee_rate(&self, platform_default: FeeRate) -> FeeRate {
        self.fee_override.unwrap_or(platform_default)
    }
}
