//! DispatchNotificationHandler - Sends a notification to every enabled device
//! of a subject in one gateway batch.
//!
//! Preference gate first, then token resolution, then delivery. Dead tokens
//! reported by the gateway are disabled; a history record is written once
//! when at least one device accepted the message.

use std::sync::Arc;

use crate::domain::notification::{
    DispatchOutcome, Notification, NotificationError, NotificationRecord, PushMessage, PushToken,
    TicketOutcome,
};
use crate::ports::{
    NotificationHistoryRepository, PreferenceRepository, PushGateway, PushTokenRepository,
};

pub struct DispatchNotificationHandler {
    tokens: Arc<dyn PushTokenRepository>,
    preferences: Arc<dyn PreferenceRepository>,
    history: Arc<dyn NotificationHistoryRepository>,
    gateway: Arc<dyn PushGateway>,
}

impl DispatchNotificationHandler {
    pub fn new(
        tokens: Arc<dyn PushTokenRepository>,
        preferences: Arc<dyn PreferenceRepository>,
        history: Arc<dyn NotificationHistoryRepository>,
        gateway: Arc<dyn PushGateway>,
    ) -> Self {
        Self {
            tokens,
            preferences,
            history,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        notification: Notification,
    ) -> Result<DispatchOutcome, NotificationError> {
        let recipient = &notification.recipient;

        // 1. Preference gate (absent row means everything is on)
        if let Some(category) = notification.category {
            let prefs = self.preferences.find(recipient).await?.unwrap_or_default();
            if !prefs.allows(category) {
                tracing::debug!(
                    recipient = %recipient,
                    category = %category,
                    "Notification suppressed by preference"
                );
                return Ok(DispatchOutcome::skipped());
            }
        }

        // 2. Resolve devices
        let tokens = self.tokens.find_enabled(recipient).await?;
        if tokens.is_empty() {
            tracing::debug!(recipient = %recipient, "No enabled push tokens");
            return Ok(DispatchOutcome::skipped());
        }

        // 3. One batch, one message per token
        let messages: Vec<PushMessage> = tokens
            .iter()
            .map(|t| PushMessage::for_token(t.token.clone(), &notification))
            .collect();

        let tickets = self.gateway.send(&messages).await.map_err(|e| {
            tracing::warn!(recipient = %recipient, error = %e, "Push gateway request failed");
            NotificationError::GatewayUnavailable(e.to_string())
        })?;

        // 4. Tickets line up with the request order
        let mut delivered = 0;
        for (token, ticket) in tokens.iter().zip(tickets.iter()) {
            match ticket.classify() {
                TicketOutcome::Delivered => delivered += 1,
                TicketOutcome::PermanentlyInvalid { error } => {
                    self.evict(token, &error).await;
                }
                TicketOutcome::Failed { message } => {
                    tracing::warn!(
                        token = %PushToken::redacted(&token.token),
                        message = %message,
                        "Push delivery failed"
                    );
                }
            }
        }
        if tickets.len() < tokens.len() {
            tracing::warn!(
                recipient = %recipient,
                expected = tokens.len(),
                received = tickets.len(),
                "Push gateway returned fewer tickets than messages"
            );
        }

        // 5. History, once per dispatch
        if delivered > 0 {
            let record = NotificationRecord::sent(&notification);
            if let Err(e) = self.history.append(&record).await {
                tracing::error!(
                    recipient = %recipient,
                    error = %e,
                    "Failed to record notification history"
                );
            }
        }

        tracing::info!(
            recipient = %recipient,
            devices = tokens.len(),
            delivered,
            "Notification dispatched"
        );

        Ok(DispatchOutcome {
            attempted: true,
            delivered,
        })
    }

    async fn evict(&self, token: &PushToken, error: &str) {
        tracing::info!(
            token = %PushToken::redacted(&token.token),
            error = %error,
            "Disabling dead push token"
        );
        if let Err(e) = self.tokens.disable(&token.token).await {
            tracing::error!(
                token = %PushToken::redacted(&token.token),
                error = %e,
                "Failed to disable push token"
            );
        }
    }
}
