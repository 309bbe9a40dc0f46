//! Notification preference queries and updates.

use std::sync::Arc;

use crate::domain::foundation::Subject;
use crate::domain::notification::{NotificationError, NotificationPreferences};
use crate::ports::PreferenceRepository;

pub struct GetPreferencesHandler {
    preferences: Arc<dyn PreferenceRepository>,
}

impl GetPreferencesHandler {
    pub fn new(preferences: Arc<dyn PreferenceRepository>) -> Self {
        Self { preferences }
    }

    /// Subjects without a stored row get every category enabled.
    pub async fn handle(&self, subject: &Subject) -> Result<NotificationPreferences, NotificationError> {
        Ok(self.preferences.find(subject).await?.unwrap_or_default())
    }
}

pub struct UpdatePreferencesHandler {
    preferences: Arc<dyn PreferenceRepository>,
}

impl UpdatePreferencesHandler {
    pub fn new(preferences: Arc<dyn PreferenceRepository>) -> Self {
        Self { preferences }
    }

    pub async fn handle(
        &self,
        subject: &Subject,
        preferences: NotificationPreferences,
    ) -> Result<NotificationPreferences, NotificationError> {
        self.preferences.save(subject, &preferences).await?;
        tracing::info!(subject = %subject, "Notification preferences updated");
        Ok(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPreferenceRepository;
    use crate::domain::foundation::SubjectId;
    use crate::domain::notification::NotificationCategory;

    #[tokio::test]
    async fn missing_row_defaults_to_all_enabled() {
        let handler = GetPreferencesHandler::new(Arc::new(InMemoryPreferenceRepository::new()));
        let subject = Subject::vendor(SubjectId::new("v1").unwrap());

        let prefs = handler.handle(&subject).await.unwrap();

        assert!(NotificationCategory::ALL.iter().all(|c| prefs.allows(*c)));
    }

    #[tokio::test]
    async fn update_is_scoped_to_subject_kind() {
        let repo = InMemoryPreferenceRepository::new();
        let get = GetPreferencesHandler::new(Arc::new(repo.clone()));
        let update = UpdatePreferencesHandler::new(Arc::new(repo));
        let id = SubjectId::new("same-id").unwrap();

        let mut prefs = NotificationPreferences::default();
        prefs.set(NotificationCategory::Promotions, false);
        update
            .handle(&Subject::buyer(id.clone()), prefs)
            .await
            .unwrap();

        let buyer = get.handle(&Subject::buyer(id.clone())).await.unwrap();
        let vendor = get.handle(&Subject::vendor(id)).await.unwrap();
        assert!(!buyer.allows(NotificationCategory::Promotions));
        assert!(vendor.allows(NotificationCategory::Promotions));
    }
}
