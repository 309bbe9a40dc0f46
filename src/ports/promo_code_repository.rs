//! Promo code repository port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::order::PromoCode;

#[async_trait]
pub trait PromoCodeRepository: Send + Sync {
    /// Looks a code up by its normalized (upper case) form.
    async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, DomainError>;

    /// Atomically adds one use to the counter.
    ///
    /// Returns false when the code does not exist. Must be a single
    /// storage-level increment, never read-modify-write.
    async fn increment_usage(&self, code: &str) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promo_code_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PromoCodeRepository) {}
    }
}
