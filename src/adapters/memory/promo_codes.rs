//! In-memory promo code store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::domain::order::PromoCode;
use crate::ports::PromoCodeRepository;

#[derive(Clone, Default)]
pub struct InMemoryPromoCodeRepository {
    codes: Arc<RwLock<HashMap<String, PromoCode>>>,
}

impl InMemoryPromoCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, promo: PromoCode) {
        self.codes.write().await.insert(promo.code.clone(), promo);
    }

    pub async fn usage_count(&self, code: &str) -> Option<u32> {
        self.codes.read().await.get(code).map(|p| p.usage_count)
    }
}

#[async_trait]
impl PromoCodeRepository for InMemoryPromoCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, DomainError> {
        Ok(self.codes.read().await.get(code).cloned())
    }

    async fn increment_usage(&self, code: &str) -> Result<bool, DomainError> {
        match self.codes.write().await.get_mut(code) {
            Some(promo) => {
                promo.usage_count = promo.usage_count.saturating_add(1);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
