//! PostgreSQL implementation of OrderRepository.
//!
//! Line items are stored as JSONB. The payout record is flattened into
//! `payout_*` columns on the same row.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp};
use crate::domain::order::{LineItem, Order, OrderStatus, PayoutRecord, PayoutStatus};
use crate::ports::{InsertResult, OrderRepository};

use super::{column, query_failed, subject_id};

const SESSION_UNIQUE_CONSTRAINT: &str = "orders_session_id_key";

const ORDER_COLUMNS: &str = r#"
    id, session_id, buyer_id, payee_id, status, items, gift_items,
    promo_code, promo_discount, delivery_fee, total, settled_amount,
    payment_method, payout_status, platform_fee, payee_amount, transfer_id,
    payout_failure_reason, payout_attempted_at, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tells a lost compare-and-set apart from a missing row.
    async fn ensure_exists(&self, id: &OrderId) -> Result<(), DomainError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(query_failed("check order"))?;

        if exists {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ))
        }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("fetch order"))?;

        row.as_ref().map(row_to_order).transpose()
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE session_id = $1",
            ORDER_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("fetch order by session"))?;

        row.as_ref().map(row_to_order).transpose()
    }

    async fn insert(&self, order: &Order) -> Result<InsertResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                id, session_id, buyer_id, payee_id, status, items, gift_items,
                promo_code, promo_discount, delivery_fee, total, settled_amount,
                payment_method, payout_status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.session_id)
        .bind(order.buyer_id.as_str())
        .bind(order.payee_id.as_ref().map(|p| p.as_str()))
        .bind(order.status.as_str())
        .bind(Json(&order.items))
        .bind(Json(&order.gift_items))
        .bind(order.promo_code.as_deref())
        .bind(order.promo_discount)
        .bind(order.delivery_fee)
        .bind(order.total)
        .bind(order.settled_amount)
        .bind(order.payment_method.as_deref())
        .bind(order.payout.status.as_str())
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertResult::Inserted),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(SESSION_UNIQUE_CONSTRAINT) =>
            {
                // Lost the race to a concurrent delivery of the same session
                let winner = self.find_by_session_id(&order.session_id).await?.ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::Conflict,
                        format!(
                            "Session {} conflicted but no order was found",
                            order.session_id
                        ),
                    )
                })?;
                Ok(InsertResult::AlreadyExists(winner.id))
            }
            Err(e) => Err(query_failed("insert order")(e)),
        }
    }

    async fn update_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_failed("update order status"))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn update_payout(
        &self,
        id: &OrderId,
        expected: PayoutStatus,
        payout: &PayoutRecord,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payout_status = $3,
                platform_fee = $4,
                payee_amount = $5,
                transfer_id = $6,
                payout_failure_reason = $7,
                payout_attempted_at = $8,
                updated_at = NOW()
            WHERE id = $1 AND payout_status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(payout.status.as_str())
        .bind(payout.platform_fee)
        .bind(payout.payee_amount)
        .bind(payout.transfer_id.as_deref())
        .bind(payout.failure_reason.as_deref())
        .bind(payout.attempted_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(query_failed("update order payout"))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }
}

fn row_to_order(row: &PgRow) -> Result<Order, DomainError> {
    let status: String = column(row, "status")?;
    let status: OrderStatus = status
        .parse()
        .map_err(|e| DomainError::database(format!("Invalid order status: {}", e)))?;

    let payout_status: String = column(row, "payout_status")?;
    let payout_status: PayoutStatus = payout_status
        .parse()
        .map_err(|e| DomainError::database(format!("Invalid payout status: {}", e)))?;

    let items: Json<Vec<LineItem>> = column(row, "items")?;
    let gift_items: Json<Vec<LineItem>> = column(row, "gift_items")?;
    let payee_id: Option<String> = column(row, "payee_id")?;
    let attempted_at: Option<chrono::DateTime<chrono::Utc>> = column(row, "payout_attempted_at")?;
    let created_at: chrono::DateTime<chrono::Utc> = column(row, "created_at")?;
    let updated_at: chrono::DateTime<chrono::Utc> = column(row, "updated_at")?;

    Ok(Order {
        id: OrderId::from_uuid(column(row, "id")?),
        session_id: column(row, "session_id")?,
        buyer_id: subject_id(column(row, "buyer_id")?)?,
        payee_id: payee_id.map(subject_id).transpose()?,
        status,
        items: items.0,
        gift_items: gift_items.0,
        promo_code: column(row, "promo_code")?,
        promo_discount: column(row, "promo_discount")?,
        delivery_fee: column(row, "delivery_fee")?,
        total: column(row, "total")?,
        settled_amount: column(row, "settled_amount")?,
        payment_method: column(row, "payment_method")?,
        payout: PayoutRecord {
            status: payout_status,
            platform_fee: column(row, "platform_fee")?,
            payee_amount: column(row, "payee_amount")?,
            transfer_id: column(row, "transfer_id")?,
            failure_reason: column(row, "payout_failure_reason")?,
            attempted_at: attempted_at.map(Timestamp::from_datetime),
        },
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_strings_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Delivering,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn payout_status_strings_roundtrip() {
        for status in [
            PayoutStatus::None,
            PayoutStatus::Pending,
            PayoutStatus::Completed,
            PayoutStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PayoutStatus>().unwrap(), status);
        }
    }

    #[test]
    fn select_lists_every_payout_column() {
        for col in [
            "payout_status",
            "platform_fee",
            "payee_amount",
            "transfer_id",
            "payout_failure_reason",
            "payout_attempted_at",
        ] {
            assert!(ORDER_COLUMNS.contains(col), "missing {}", col);
        }
    }
}
