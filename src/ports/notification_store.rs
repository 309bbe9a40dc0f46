//! Preference and history storage ports.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NotificationId, Subject};
use crate::domain::notification::{NotificationPreferences, NotificationRecord};

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Returns `None` when the subject never saved preferences.
    async fn find(&self, subject: &Subject) -> Result<Option<NotificationPreferences>, DomainError>;

    async fn save(
        &self,
        subject: &Subject,
        preferences: &NotificationPreferences,
    ) -> Result<(), DomainError>;
}

#[async_trait]
pub trait NotificationHistoryRepository: Send + Sync {
    async fn append(&self, record: &NotificationRecord) -> Result<(), DomainError>;

    /// Newest first, at most `limit` records.
    async fn list_for_subject(
        &self,
        subject: &Subject,
        limit: u32,
    ) -> Result<Vec<NotificationRecord>, DomainError>;

    /// Returns false when no record has the id.
    async fn mark_read(&self, id: &NotificationId) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_ports_are_object_safe() {
        fn _prefs(_repo: &dyn PreferenceRepository) {}
        fn _history(_repo: &dyn NotificationHistoryRepository) {}
    }
}
