//! Notification history queries.

use std::sync::Arc;

use crate::domain::foundation::{NotificationId, Subject};
use crate::domain::notification::{NotificationError, NotificationRecord};
use crate::ports::NotificationHistoryRepository;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

pub struct ListNotificationsHandler {
    history: Arc<dyn NotificationHistoryRepository>,
}

impl ListNotificationsHandler {
    pub fn new(history: Arc<dyn NotificationHistoryRepository>) -> Self {
        Self { history }
    }

    /// Newest first, capped at 200 records.
    pub async fn handle(
        &self,
        subject: &Subject,
        limit: Option<u32>,
    ) -> Result<Vec<NotificationRecord>, NotificationError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Ok(self.history.list_for_subject(subject, limit).await?)
    }
}

pub struct MarkNotificationReadHandler {
    history: Arc<dyn NotificationHistoryRepository>,
}

impl MarkNotificationReadHandler {
    pub fn new(history: Arc<dyn NotificationHistoryRepository>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, id: NotificationId) -> Result<(), NotificationError> {
        if !self.history.mark_read(&id).await? {
            return Err(NotificationError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryNotificationHistory;
    use crate::domain::foundation::SubjectId;
    use crate::domain::notification::Notification;

    fn buyer() -> Subject {
        Subject::buyer(SubjectId::new("b1").unwrap())
    }

    #[tokio::test]
    async fn lists_and_marks_read() {
        let history = InMemoryNotificationHistory::new();
        let record = NotificationRecord::sent(&Notification::new(buyer(), "Order placed", "Thanks"));
        history.append(&record).await.unwrap();

        let list = ListNotificationsHandler::new(Arc::new(history.clone()));
        let mark = MarkNotificationReadHandler::new(Arc::new(history.clone()));

        mark.handle(record.id).await.unwrap();
        let records = list.handle(&buyer(), None).await.unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].read);
    }

    #[tokio::test]
    async fn marking_unknown_record_is_not_found() {
        let mark = MarkNotificationReadHandler::new(Arc::new(InMemoryNotificationHistory::new()));

        let result = mark.handle(NotificationId::new()).await;

        assert!(matches!(result, Err(NotificationError::NotFound(_))));
    }

    #[tokio::test]
    async fn zero_limit_still_returns_latest_record() {
        let history = InMemoryNotificationHistory::new();
        for title in ["first", "second"] {
            history
                .append(&NotificationRecord::sent(&Notification::new(buyer(), title, "")))
                .await
                .unwrap();
        }
        let list = ListNotificationsHandler::new(Arc::new(history));

        let records = list.handle(&buyer(), Some(0)).await.unwrap();

        assert_eq!(records.len(), 1);
    }
}
