//! In-memory payee directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SubjectId};
use crate::domain::payout::PayeeAccount;
use crate::ports::PayeeDirectory;

#[derive(Clone, Default)]
pub struct InMemoryPayeeDirectory {
    payees: Arc<RwLock<HashMap<SubjectId, PayeeAccount>>>,
}

impl InMemoryPayeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, account: PayeeAccount) {
        self.payees
            .write()
            .await
            .insert(account.payee_id.clone(), account);
    }
}

#[async_trait]
impl PayeeDirectory for InMemoryPayeeDirectory {
    async fn find_payee(&self, payee_id: &SubjectId) -> Result<Option<PayeeAccount>, DomainError> {
        Ok(self.payees.read().await.get(payee_id).cloned())
    }
}
