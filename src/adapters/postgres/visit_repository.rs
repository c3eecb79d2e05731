//! PostgreSQL implementation of VisitRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt_row, db_error, violates};
use crate::domain::campaign::{CampaignError, CampaignStatus};
use crate::domain::foundation::{CampaignId, DomainError, ProfileId, Timestamp, VisitId};
use crate::domain::visit::{CampaignStats, Visit};
use crate::ports::VisitRepository;

pub struct PostgresVisitRepository {
    pool: PgPool,
}

impl PostgresVisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VisitRow {
    id: Uuid,
    campaign_id: Uuid,
    visitor_id: String,
    created_at: DateTime<Utc>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Visit {
            id: VisitId::from_uuid(row.id),
            campaign_id: CampaignId::from_uuid(row.campaign_id),
            visitor_id: row.visitor_id,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    campaign_id: Uuid,
    name: String,
    status: String,
    allocated_credits: i64,
    spent_credits: i64,
    total_visits: i64,
    unique_visitors: i64,
}

impl TryFrom<StatsRow> for CampaignStats {
    type Error = DomainError;

    fn try_from(row: StatsRow) -> Result<Self, Self::Error> {
        let status: CampaignStatus = row.status.parse().map_err(|e| corrupt_row("campaigns", e))?;
        Ok(CampaignStats {
            campaign_id: CampaignId::from_uuid(row.campaign_id),
            name: row.name,
            status,
            allocated_credits: row.allocated_credits,
            spent_credits: row.spent_credits,
            total_visits: row.total_visits,
            unique_visitors: row.unique_visitors,
        })
    }
}

#[async_trait]
impl VisitRepository for PostgresVisitRepository {
    async fn record(&self, visit: &Visit) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO visits (id, campaign_id, visitor_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(visit.id.as_uuid())
        .bind(visit.campaign_id.as_uuid())
        .bind(&visit.visitor_id)
        .bind(visit.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "visits_campaign_id_fkey") {
                return DomainError::from(CampaignError::NotFound(visit.campaign_id));
            }
            db_error("Failed to insert visit", e)
        })?;

        Ok(())
    }

    async fn list_for_campaign(
        &self,
        campaign_id: &CampaignId,
        limit: i64,
    ) -> Result<Vec<Visit>, DomainError> {
        let rows: Vec<VisitRow> = sqlx::query_as(
            r#"
            SELECT id, campaign_id, visitor_id, created_at
            FROM visits
            WHERE campaign_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(campaign_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list visits", e))?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }

    async fn stats_for_owner(&self, owner: &ProfileId) -> Result<Vec<CampaignStats>, DomainError> {
        let rows: Vec<StatsRow> = sqlx::query_as(
            r#"
            SELECT c.id AS campaign_id,
                   c.name,
                   c.status,
                   c.allocated_credits,
                   c.spent_credits,
                   COUNT(v.id) AS total_visits,
                   COUNT(DISTINCT v.visitor_id) AS unique_visitors
            FROM campaigns c
            LEFT JOIN visits v ON v.campaign_id = c.id
            WHERE c.owner_id = $1
            GROUP BY c.id
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to aggregate visits", e))?;

        rows.into_iter().map(CampaignStats::try_from).collect()
    }
}
