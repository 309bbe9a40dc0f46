//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresOrderRepository` - Orders, unique on checkout session id
//! - `PostgresPromoCodeRepository` - Promo lookup and atomic usage counter
//! - `PostgresPayeeDirectory` - Vendor payout settings
//! - `PostgresPushTokenRepository` - Device token registry
//! - `PostgresPreferenceRepository` / `PostgresNotificationHistory`
//!
//! The schema lives in `migrations/` and is applied with `sqlx::migrate!`.

mod notifications;
mod orders;
mod payees;
mod promo_codes;
mod push_tokens;

pub use notifications::{PostgresNotificationHistory, PostgresPreferenceRepository};
pub use orders::PostgresOrderRepository;
pub use payees::PostgresPayeeDirectory;
pub use promo_codes::PostgresPromoCodeRepository;
pub use push_tokens::PostgresPushTokenRepository;

use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::foundation::{DomainError, Subject, SubjectId, SubjectKind};

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Reads a column, reporting decode failures as database errors.
fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::database(format!("Failed to get {}: {}", name, e)).with_detail("column", name)
    })
}

fn query_failed(action: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::database(format!("Failed to {}: {}", action, e))
}

fn subject_id(raw: String) -> Result<SubjectId, DomainError> {
    SubjectId::new(raw)
        .map_err(|e| DomainError::database(format!("Invalid subject id in row: {}", e)))
}

fn subject_from_row(row: &PgRow) -> Result<Subject, DomainError> {
    let id = subject_id(column(row, "subject_id")?)?;
    let kind: String = column(row, "subject_kind")?;
    let kind: SubjectKind = kind
        .parse()
        .map_err(|e| DomainError::database(format!("Invalid subject kind in row: {}", e)))?;
    Ok(Subject::new(id, kind))
}
