//! In-memory preference and history stores.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, NotificationId, Subject};
use crate::domain::notification::{NotificationPreferences, NotificationRecord};
use crate::ports::{NotificationHistoryRepository, PreferenceRepository};

#[derive(Clone, Default)]
pub struct InMemoryPreferenceRepository {
    prefs: Arc<RwLock<HashMap<Subject, NotificationPreferences>>>,
}

impl InMemoryPreferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferenceRepository {
    async fn find(&self, subject: &Subject) -> Result<Option<NotificationPreferences>, DomainError> {
        Ok(self.prefs.read().await.get(subject).copied())
    }

    async fn save(
        &self,
        subject: &Subject,
        preferences: &NotificationPreferences,
    ) -> Result<(), DomainError> {
        self.prefs
            .write()
            .await
            .insert(subject.clone(), *preferences);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryNotificationHistory {
    records: Arc<RwLock<Vec<NotificationRecord>>>,
}

impl InMemoryNotificationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<NotificationRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl NotificationHistoryRepository for InMemoryNotificationHistory {
    async fn append(&self, record: &NotificationRecord) -> Result<(), DomainError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_for_subject(
        &self,
        subject: &Subject,
        limit: u32,
    ) -> Result<Vec<NotificationRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| &r.subject == subject)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubjectId;
    use crate::domain::notification::Notification;

    fn subject() -> Subject {
        Subject::vendor(SubjectId::new("v1").unwrap())
    }

    #[tokio::test]
    async fn history_lists_newest_first() {
        let history = InMemoryNotificationHistory::new();
        for title in ["first", "second", "third"] {
            let record = NotificationRecord::sent(&Notification::new(subject(), title, "body"));
            history.append(&record).await.unwrap();
        }

        let listed = history.list_for_subject(&subject(), 2).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "third");
        assert_eq!(listed[1].title, "second");
    }

    #[tokio::test]
    async fn mark_read_reports_unknown_ids() {
        let history = InMemoryNotificationHistory::new();
        let record = NotificationRecord::sent(&Notification::new(subject(), "t", "b"));
        history.append(&record).await.unwrap();

        assert!(history.mark_read(&record.id).await.unwrap());
        assert!(!history.mark_read(&NotificationId::new()).await.unwrap());
        assert!(history.all().await[0].read);
    }
}
