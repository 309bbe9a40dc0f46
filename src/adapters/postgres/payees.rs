//! PostgreSQL implementation of PayeeDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, SubjectId};
use crate::domain::payout::{FeeRate, PayeeAccount};
use crate::ports::PayeeDirectory;

use super::{column, query_failed};

#[derive(Clone)]
pub struct PostgresPayeeDirectory {
    pool: PgPool,
}

impl PostgresPayeeDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayeeDirectory for PostgresPayeeDirectory {
    async fn find_payee(&self, payee_id: &SubjectId) -> Result<Option<PayeeAccount>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT payout_account_id, fee_bps, payouts_enabled
            FROM payee_accounts
            WHERE payee_id = $1
            "#,
        )
        .bind(payee_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("fetch payee account"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let fee_bps: Option<i32> = column(&row, "fee_bps")?;
        let fee_override = fee_bps
            .map(|bps| {
                u32::try_from(bps)
                    .ok()
                    .and_then(|bps| FeeRate::from_bps(bps).ok())
                    .ok_or_else(|| DomainError::database(format!("Invalid fee_bps: {}", bps)))
            })
            .transpose()?;

        Ok(Some(PayeeAccount {
            payee_id: payee_id.clone(),
            payout_account_id: column(&row, "payout_account_id")?,
            fee_override,
            payouts_enabled: column(&row, "payouts_enabled")?,
        }))
    }
}
