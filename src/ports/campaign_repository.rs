//! CampaignRepository port - campaign persistence and funding.

use async_trait::async_trait;

use crate::domain::campaign::{Campaign, CampaignStatus, CampaignUpdate, NewCampaign};
use crate::domain::foundation::{CampaignId, DomainError, ProfileId};

/// Filter for the admin listing.
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Funds and inserts a campaign in one transaction.
    ///
    /// Locks the owner's profile, rejects with `InsufficientCredits` when
    /// the balance is below the allocation, debits the balance, inserts the
    /// campaign and a spend ledger entry. Nothing is written on failure.
    async fn create_funded(&self, campaign: NewCampaign) -> Result<Campaign, DomainError>;

    async fn find(&self, id: &CampaignId) -> Result<Option<Campaign>, DomainError>;

    /// Applies `update` to the owner's campaign under a row lock.
    ///
    /// Campaigns owned by someone else are reported as `CampaignNotFound`.
    async fn update_owned(
        &self,
        id: &CampaignId,
        owner: &ProfileId,
        update: CampaignUpdate,
    ) -> Result<Campaign, DomainError>;

    /// Newest first.
    async fn list_by_owner(&self, owner: &ProfileId) -> Result<Vec<Campaign>, DomainError>;

    /// Newest first.
    async fn list_all(&self, filter: CampaignFilter) -> Result<Vec<Campaign>, DomainError>;
}
