//! Read access to payee payout settings.
//!
//! Vendor onboarding lives outside this service; the splitter only reads
//! the result.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubjectId};
use crate::domain::payout::PayeeAccount;

#[async_trait]
pub trait PayeeDirectory: Send + Sync {
    /// Returns `None` when the payee is unknown.
    async fn find_payee(&self, payee_id: &SubjectId) -> Result<Option<PayeeAccount>, DomainError>;
}
