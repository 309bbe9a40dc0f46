//! In-memory push token registry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Subject, Timestamp};
use crate::domain::notification::PushToken;
use crate::ports::PushTokenRepository;

#[derive(Clone, Default)]
pub struct InMemoryPushTokenRepository {
    tokens: Arc<RwLock<HashMap<String, PushToken>>>,
}

impl InMemoryPushTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, token: &str) -> Option<PushToken> {
        self.tokens.read().await.get(token).cloned()
    }
}

#[async_trait]
impl PushTokenRepository for InMemoryPushTokenRepository {
    async fn upsert(&self, token: &PushToken) -> Result<(), DomainError> {
        self.tokens
            .write()
            .await
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_enabled(&self, owner: &Subject) -> Result<Vec<PushToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut found: Vec<PushToken> = tokens
            .values()
            .filter(|t| t.enabled && &t.owner == owner)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.token.cmp(&b.token));
        Ok(found)
    }

    async fn disable(&self, token: &str) -> Result<(), DomainError> {
        if let Some(entry) = self.tokens.write().await.get_mut(token) {
            entry.enabled = false;
            entry.updated_at = Timestamp::now();
        }
        Ok(())
    }
}
