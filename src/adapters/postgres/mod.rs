//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresProfileRepository` - profiles and admin promotion
//! - `PostgresCampaignRepository` - campaigns and atomic funding
//! - `PostgresCreditLedger` - idempotent grants keyed on payment reference
//! - `PostgresVisitRepository` - visit log and per-campaign aggregates
//! - `PostgresSubscriptionRepository` - local subscription mirror
//! - `PostgresWebhookEventRepository` - webhook dedup store
//!
//! Multi-row mutations lock the owning profile row with `FOR UPDATE`
//! before touching its balance.

mod campaign_repository;
mod credit_ledger;
mod profile_repository;
mod subscription_repository;
mod visit_repository;
mod webhook_event_repository;

pub use campaign_repository::PostgresCampaignRepository;
pub use credit_ledger::PostgresCreditLedger;
pub use profile_repository::PostgresProfileRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use visit_repository::PostgresVisitRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};
use crate::domain::profile::profile_not_found;

type PgTransaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Wraps a sqlx failure. The message stays in logs; HTTP responses
/// replace it with a generic one.
fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.constraint() == Some(constraint))
}

async fn begin(pool: &PgPool) -> Result<PgTransaction<'static>, DomainError> {
    pool.begin()
        .await
        .map_err(|e| db_error("Failed to begin transaction", e))
}

async fn commit(tx: PgTransaction<'_>) -> Result<(), DomainError> {
    tx.commit()
        .await
        .map_err(|e| db_error("Failed to commit transaction", e))
}

/// Locks the profile row for the rest of the transaction and returns its
/// balance.
async fn lock_profile_credits(
    tx: &mut PgTransaction<'_>,
    profile_id: &ProfileId,
) -> Result<i64, DomainError> {
    sqlx::query_scalar::<_, i64>("SELECT credits FROM profiles WHERE id = $1 FOR UPDATE")
        .bind(profile_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to lock profile", e))?
        .ok_or_else(|| profile_not_found(profile_id))
}

fn corrupt_row(table: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} row: {}", table, detail),
    )
}
