//! PostgreSQL implementations of the preference and history ports.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, NotificationId, Subject, Timestamp};
use crate::domain::notification::{
    NotificationCategory, NotificationPreferences, NotificationRecord,
};
use crate::ports::{NotificationHistoryRepository, PreferenceRepository};

use super::{column, query_failed, subject_from_row};

#[derive(Clone)]
pub struct PostgresPreferenceRepository {
    pool: PgPool,
}

impl PostgresPreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceRepository for PostgresPreferenceRepository {
    async fn find(&self, subject: &Subject) -> Result<Option<NotificationPreferences>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT orders, messages, reminders, promotions, consultations
            FROM notification_preferences
            WHERE subject_id = $1 AND subject_kind = $2
            "#,
        )
        .bind(subject.id.as_str())
        .bind(subject.kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("fetch notification preferences"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(NotificationPreferences {
            orders: column(&row, "orders")?,
            messages: column(&row, "messages")?,
            reminders: column(&row, "reminders")?,
            promotions: column(&row, "promotions")?,
            consultations: column(&row, "consultations")?,
        }))
    }

    async fn save(
        &self,
        subject: &Subject,
        preferences: &NotificationPreferences,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notification_preferences (
                subject_id, subject_kind, orders, messages, reminders, promotions,
                consultations, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (subject_id, subject_kind) DO UPDATE SET
                orders = EXCLUDED.orders,
                messages = EXCLUDED.messages,
                reminders = EXCLUDED.reminders,
                promotions = EXCLUDED.promotions,
                consultations = EXCLUDED.consultations,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(subject.id.as_str())
        .bind(subject.kind.as_str())
        .bind(preferences.orders)
        .bind(preferences.messages)
        .bind(preferences.reminders)
        .bind(preferences.promotions)
        .bind(preferences.consultations)
        .execute(&self.pool)
        .await
        .map_err(query_failed("save notification preferences"))?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresNotificationHistory {
    pool: PgPool,
}

impl PostgresNotificationHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationHistoryRepository for PostgresNotificationHistory {
    async fn append(&self, record: &NotificationRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notification_history (
                id, subject_id, subject_kind, title, body, category, sent_at, read
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.subject.id.as_str())
        .bind(record.subject.kind.as_str())
        .bind(&record.title)
        .bind(&record.body)
        .bind(record.category.map(|c| c.as_str()))
        .bind(record.sent_at.as_datetime())
        .bind(record.read)
        .execute(&self.pool)
        .await
        .map_err(query_failed("append notification history"))?;

        Ok(())
    }

    async fn list_for_subject(
        &self,
        subject: &Subject,
        limit: u32,
    ) -> Result<Vec<NotificationRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, subject_id, subject_kind, title, body, category, sent_at, read
            FROM notification_history
            WHERE subject_id = $1 AND subject_kind = $2
            ORDER BY sent_at DESC
            LIMIT $3
            "#,
        )
        .bind(subject.id.as_str())
        .bind(subject.kind.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("list notification history"))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE notification_history SET read = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_failed("mark notification read"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_record(row: &PgRow) -> Result<NotificationRecord, DomainError> {
    let category: Option<String> = column(row, "category")?;
    let category = category
        .map(|c| c.parse::<NotificationCategory>())
        .transpose()
        .map_err(|e| DomainError::database(format!("Invalid category: {}", e)))?;
    let sent_at: chrono::DateTime<chrono::Utc> = column(row, "sent_at")?;

    Ok(NotificationRecord {
        id: NotificationId::from_uuid(column(row, "id")?),
        subject: subject_from_row(row)?,
        title: column(row, "title")?,
        body: column(row, "body")?,
        category,
        sent_at: Timestamp::from_datetime(sent_at),
        read: column(row, "read")?,
    })
}
