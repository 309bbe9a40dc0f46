//! PostgreSQL implementation of PromoCodeRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::order::{DiscountType, PromoCode};
use crate::ports::PromoCodeRepository;

use super::{column, query_failed};

#[derive(Clone)]
pub struct PostgresPromoCodeRepository {
    pool: PgPool,
}

impl PostgresPromoCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromoCodeRepository for PostgresPromoCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT code, discount_type, discount_value, usage_cap, usage_count
            FROM promo_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("fetch promo code"))?;

        row.as_ref().map(row_to_promo).transpose()
    }

    async fn increment_usage(&self, code: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE promo_codes SET usage_count = usage_count + 1 WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(query_failed("increment promo usage"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_promo(row: &PgRow) -> Result<PromoCode, DomainError> {
    let discount_type: String = column(row, "discount_type")?;
    let discount_type: DiscountType = discount_type
        .parse()
        .map_err(|e| DomainError::database(format!("Invalid discount type: {}", e)))?;
    let usage_cap: Option<i32> = column(row, "usage_cap")?;
    let usage_count: i32 = column(row, "usage_count")?;

    Ok(PromoCode {
        code: column(row, "code")?,
        discount_type,
        discount_value: column(row, "discount_value")?,
        usage_cap: usage_cap.map(non_negative).transpose()?,
        usage_count: non_negative(usage_count)?,
    })
}

fn non_negative(value: i32) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::database(format!("Negative promo counter: {}", value)))
}
