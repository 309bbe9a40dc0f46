//! Notification history records.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{NotificationId, Subject, Timestamp};

use super::{Notification, NotificationCategory};

/// Append-only record of a notification that reached at least one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub subject: Subject,
    pub title: String,
    pub body: String,
    pub category: Option<NotificationCategory>,
    pub sent_at: Timestamp,
    pub read: bool,
}

impl NotificationRecord {
    pub fn sent(notification: &Notification) -> Self {
        Self {
            id: NotificationId::new(),
            subject: notification.recipient.clone(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            category: notification.category,
            sent_at: Timestamp::now(),
            read: false,
        }
    }
}
