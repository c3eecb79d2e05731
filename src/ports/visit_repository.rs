//! VisitRepository port - append-only visit log and its aggregates.

use async_trait::async_trait;

use crate::domain::foundation::{CampaignId, DomainError, ProfileId};
use crate::domain::visit::{CampaignStats, Visit};

#[async_trait]
pub trait VisitRepository: Send + Sync {
    async fn record(&self, visit: &Visit) -> Result<(), DomainError>;

    /// Newest first, at most `limit` rows.
    async fn list_for_campaign(
        &self,
        campaign_id: &CampaignId,
        limit: i64,
    ) -> Result<Vec<Visit>, DomainError>;

    /// One entry per campaign owned by `owner`, including campaigns
    /// without visits.
    async fn stats_for_owner(&self, owner: &ProfileId) -> Result<Vec<CampaignStats>, DomainError>;
}
