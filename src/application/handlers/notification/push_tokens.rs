//! Push token registration and disabling.

use std::sync::Arc;

use crate::domain::foundation::{Subject, ValidationError};
use crate::domain::notification::{NotificationError, Platform, PushToken};
use crate::ports::PushTokenRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPushTokenCommand {
    pub token: String,
    pub owner: Subject,
    pub platform: Platform,
}

/// Upserts by token value. A token seen before is re-enabled and moved to
/// the new owner.
pub struct RegisterPushTokenHandler {
    tokens: Arc<dyn PushTokenRepository>,
}

impl RegisterPushTokenHandler {
    pub fn new(tokens: Arc<dyn PushTokenRepository>) -> Self {
        Self { tokens }
    }

    pub async fn handle(&self, cmd: RegisterPushTokenCommand) -> Result<PushToken, NotificationError> {
        let token = PushToken::register(cmd.token, cmd.owner, cmd.platform)?;
        self.tokens.upsert(&token).await?;

        tracing::info!(
            owner = %token.owner,
            platform = %token.platform,
            token = %PushToken::redacted(&token.token),
            "Push token registered"
        );
        Ok(token)
    }
}

/// Idempotent; unknown tokens are a no-op and rows are never deleted.
pub struct DisablePushTokenHandler {
    tokens: Arc<dyn PushTokenRepository>,
}

impl DisablePushTokenHandler {
    pub fn new(tokens: Arc<dyn PushTokenRepository>) -> Self {
        Self { tokens }
    }

    pub async fn handle(&self, token: &str) -> Result<(), NotificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ValidationError::empty_field("token").into());
        }
        self.tokens.disable(token).await?;
        Ok(())
    }
}
