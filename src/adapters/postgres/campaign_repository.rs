//! PostgreSQL implementation of CampaignRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::credit_ledger::insert_transaction;
use super::{begin, commit, corrupt_row, db_error, lock_profile_credits};
use crate::domain::campaign::{
    Campaign, CampaignError, CampaignStatus, CampaignUpdate, NewCampaign,
};
use crate::domain::credits::CreditTransaction;
use crate::domain::foundation::{CampaignId, DomainError, ProfileId, Timestamp};
use crate::ports::{CampaignFilter, CampaignRepository};

const CAMPAIGN_COLUMNS: &str = "id, owner_id, name, target_url, status, allocated_credits, \
     spent_credits, created_at, updated_at";

pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    target_url: Option<String>,
    status: String,
    allocated_credits: i64,
    spent_credits: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = DomainError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let status: CampaignStatus = row.status.parse().map_err(|e| corrupt_row("campaigns", e))?;
        Ok(Campaign {
            id: CampaignId::from_uuid(row.id),
            owner_id: ProfileId::from_uuid(row.owner_id),
            name: row.name,
            target_url: row.target_url,
            status,
            allocated_credits: row.allocated_credits,
            spent_credits: row.spent_credits,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    async fn create_funded(&self, new: NewCampaign) -> Result<Campaign, DomainError> {
        let owner = new.owner_id;
        let mut tx = begin(&self.pool).await?;
        let available = lock_profile_credits(&mut tx, &owner).await?;

        let campaign = Campaign::fund(new, available)?;

        sqlx::query("UPDATE profiles SET credits = credits - $2, updated_at = now() WHERE id = $1")
            .bind(owner.as_uuid())
            .bind(campaign.allocated_credits)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to debit profile", e))?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, owner_id, name, target_url, status, allocated_credits,
                spent_credits, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(campaign.id.as_uuid())
        .bind(owner.as_uuid())
        .bind(&campaign.name)
        .bind(&campaign.target_url)
        .bind(campaign.status.as_str())
        .bind(campaign.allocated_credits)
        .bind(campaign.spent_credits)
        .bind(campaign.created_at.as_datetime())
        .bind(campaign.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert campaign", e))?;

        let spend = CreditTransaction::spend(
            owner,
            campaign.id,
            campaign.allocated_credits,
            &campaign.name,
        );
        insert_transaction(&mut tx, &spend).await?;

        commit(tx).await?;
        tracing::info!(
            campaign_id = %campaign.id,
            owner_id = %owner,
            allocated = campaign.allocated_credits,
            "campaign funded"
        );
        Ok(campaign)
    }

    async fn find(&self, id: &CampaignId) -> Result<Option<Campaign>, DomainError> {
        let row: Option<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {} FROM campaigns WHERE id = $1",
            CAMPAIGN_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch campaign", e))?;

        row.map(Campaign::try_from).transpose()
    }

    async fn update_owned(
        &self,
        id: &CampaignId,
        owner: &ProfileId,
        update: CampaignUpdate,
    ) -> Result<Campaign, DomainError> {
        let mut tx = begin(&self.pool).await?;

        let row: Option<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {} FROM campaigns WHERE id = $1 AND owner_id = $2 FOR UPDATE",
            CAMPAIGN_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock campaign", e))?;

        let mut campaign = match row {
            Some(row) => Campaign::try_from(row)?,
            None => return Err(CampaignError::NotFound(*id).into()),
        };
        campaign.apply(update)?;

        sqlx::query(
            r#"
            UPDATE campaigns SET
                name = $2,
                target_url = $3,
                status = $4,
                spent_credits = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(campaign.id.as_uuid())
        .bind(&campaign.name)
        .bind(&campaign.target_url)
        .bind(campaign.status.as_str())
        .bind(campaign.spent_credits)
        .bind(campaign.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update campaign", e))?;

        commit(tx).await?;
        Ok(campaign)
    }

    async fn list_by_owner(&self, owner: &ProfileId) -> Result<Vec<Campaign>, DomainError> {
        let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {} FROM campaigns WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            CAMPAIGN_COLUMNS
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list campaigns", e))?;

        rows.into_iter().map(Campaign::try_from).collect()
    }

    async fn list_all(&self, filter: CampaignFilter) -> Result<Vec<Campaign>, DomainError> {
        let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM campaigns
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            CAMPAIGN_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list campaigns", e))?;

        rows.into_iter().map(Campaign::try_from).collect()
    }
}
