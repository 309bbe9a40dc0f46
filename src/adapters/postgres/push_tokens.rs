//! PostgreSQL implementation of PushTokenRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Subject, Timestamp};
use crate::domain::notification::{Platform, PushToken};
use crate::ports::PushTokenRepository;

use super::{column, query_failed, subject_from_row};

#[derive(Clone)]
pub struct PostgresPushTokenRepository {
    pool: PgPool,
}

impl PostgresPushTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushTokenRepository for PostgresPushTokenRepository {
    async fn upsert(&self, token: &PushToken) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO push_tokens (token, subject_id, subject_kind, platform, enabled, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (token) DO UPDATE SET
                subject_id = EXCLUDED.subject_id,
                subject_kind = EXCLUDED.subject_kind,
                platform = EXCLUDED.platform,
                enabled = EXCLUDED.enabled,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&token.token)
        .bind(token.owner.id.as_str())
        .bind(token.owner.kind.as_str())
        .bind(token.platform.as_str())
        .bind(token.enabled)
        .bind(token.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(query_failed("upsert push token"))?;

        Ok(())
    }

    async fn find_enabled(&self, owner: &Subject) -> Result<Vec<PushToken>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT token, subject_id, subject_kind, platform, enabled, updated_at
            FROM push_tokens
            WHERE subject_id = $1 AND subject_kind = $2 AND enabled
            ORDER BY token
            "#,
        )
        .bind(owner.id.as_str())
        .bind(owner.kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("fetch push tokens"))?;

        rows.iter().map(row_to_token).collect()
    }

    async fn disable(&self, token: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE push_tokens SET enabled = FALSE, updated_at = NOW() WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(query_failed("disable push token"))?;

        Ok(())
    }
}

fn row_to_token(row: &PgRow) -> Result<PushToken, DomainError> {
    let platform: String = column(row, "platform")?;
    let platform: Platform = platform
        .parse()
        .map_err(|e| DomainError::database(format!("Invalid platform: {}", e)))?;
    let updated_at: chrono::DateTime<chrono::Utc> = column(row, "updated_at")?;

    Ok(PushToken {
        token: column(row, "token")?,
        owner: subject_from_row(row)?,
        platform,
        enabled: column(row, "enabled")?,
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
