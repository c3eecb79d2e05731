//! PostgreSQL implementation of CreditLedger.
//!
//! Grant protocol, all in one transaction:
//! 1. lock the profile row
//! 2. insert the ledger row, `ON CONFLICT (payment_reference) DO NOTHING`
//! 3. only if a row was inserted, add the amount to the balance
//!
//! The unique reference makes replays and concurrent deliveries of the
//! same payment credit the profile exactly once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{begin, commit, corrupt_row, db_error, lock_profile_credits, PgTransaction};
use crate::domain::credits::{CreditGrant, CreditTransaction, GrantOutcome, TransactionKind};
use crate::domain::foundation::{CampaignId, DomainError, ProfileId, Timestamp, TransactionId};
use crate::ports::CreditLedger;

pub struct PostgresCreditLedger {
    pool: PgPool,
}

impl PostgresCreditLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    profile_id: Uuid,
    campaign_id: Option<Uuid>,
    kind: String,
    amount: i64,
    description: String,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for CreditTransaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind: TransactionKind = row
            .kind
            .parse()
            .map_err(|e| corrupt_row("credit_transactions", e))?;
        Ok(CreditTransaction {
            id: TransactionId::from_uuid(row.id),
            profile_id: ProfileId::from_uuid(row.profile_id),
            campaign_id: row.campaign_id.map(CampaignId::from_uuid),
            kind,
            amount: row.amount,
            description: row.description,
            payment_reference: row.payment_reference,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Inserts a ledger row. Returns `false` when the payment reference is
/// already present and nothing was written.
pub(super) async fn insert_transaction(
    tx: &mut PgTransaction<'_>,
    entry: &CreditTransaction,
) -> Result<bool, DomainError> {
    let inserted: Option<Uuid> = sqlx::query_scalar(
        r#"
        INSERT INTO credit_transactions (
            id, profile_id, campaign_id, kind, amount, description,
            payment_reference, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (payment_reference) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.profile_id.as_uuid())
    .bind(entry.campaign_id.map(|id| *id.as_uuid()))
    .bind(entry.kind.as_str())
    .bind(entry.amount)
    .bind(&entry.description)
    .bind(&entry.payment_reference)
    .bind(entry.created_at.as_datetime())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert ledger entry", e))?;

    Ok(inserted.is_some())
}

#[async_trait]
impl CreditLedger for PostgresCreditLedger {
    async fn grant(&self, grant: &CreditGrant) -> Result<GrantOutcome, DomainError> {
        let mut tx = begin(&self.pool).await?;
        let current = lock_profile_credits(&mut tx, &grant.profile_id).await?;

        let transaction = grant.to_transaction();
        if !insert_transaction(&mut tx, &transaction).await? {
            commit(tx).await?;
            tracing::info!(
                profile_id = %grant.profile_id,
                payment_reference = %grant.payment_reference,
                "duplicate credit grant skipped"
            );
            return Ok(GrantOutcome::Duplicate { balance: current });
        }

        let balance: i64 = sqlx::query_scalar(
            r#"
            UPDATE profiles SET credits = credits + $2, updated_at = now()
            WHERE id = $1
            RETURNING credits
            "#,
        )
        .bind(grant.profile_id.as_uuid())
        .bind(grant.amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to credit profile", e))?;

        commit(tx).await?;
        tracing::info!(
            profile_id = %grant.profile_id,
            payment_reference = %grant.payment_reference,
            amount = grant.amount,
            balance,
            "credits granted"
        );

        Ok(GrantOutcome::Applied {
            transaction,
            balance,
        })
    }

    async fn list_for_profile(
        &self,
        profile_id: &ProfileId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CreditTransaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, profile_id, campaign_id, kind, amount, description,
                   payment_reference, created_at
            FROM credit_transactions
            WHERE profile_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(profile_id.as_uuid())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list ledger entries", e))?;

        rows.into_iter().map(CreditTransaction::try_from).collect()
    }
}
