//! CreateCampaignHandler - Creates a campaign funded from the owner's balance.

use std::sync::Arc;

use crate::domain::campaign::{Campaign, NewCampaign};
use crate::domain::foundation::{DomainError, ProfileId};
use crate::ports::CampaignRepository;

/// Command to create and fund a campaign.
#[derive(Debug, Clone)]
pub struct CreateCampaignCommand {
    pub owner_id: ProfileId,
    pub name: String,
    pub target_url: Option<String>,
    pub allocated_credits: i64,
}

pub struct CreateCampaignHandler {
    campaigns: Arc<dyn CampaignRepository>,
}

impl CreateCampaignHandler {
    pub fn new(campaigns: Arc<dyn CampaignRepository>) -> Self {
        Self { campaigns }
    }

    /// Fails with `InsufficientCredits` when the allocation exceeds the
    /// owner's balance; nothing is written in that case.
    pub async fn handle(&self, cmd: CreateCampaignCommand) -> Result<Campaign, DomainError> {
        let new = NewCampaign::new(
            cmd.owner_id,
            &cmd.name,
            cmd.target_url,
            cmd.allocated_credits,
        )?;
        self.campaigns.create_funded(new).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::campaign::CampaignStatus;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::Profile;
    use crate::ports::ProfileRepository;

    async fn setup(balance: i64) -> (CreateCampaignHandler, Arc<InMemoryStore>, ProfileId) {
        let store = Arc::new(InMemoryStore::new());
        let owner = Profile::new(ProfileId::new(), "o@example.com", None, balance);
        let owner_id = owner.id;
        store.put_profile(owner).await;
        (CreateCampaignHandler::new(store.clone()), store, owner_id)
    }

    fn command(owner_id: ProfileId, allocated: i64) -> CreateCampaignCommand {
        CreateCampaignCommand {
            owner_id,
            name: "Spring launch".to_string(),
            target_url: Some("https://example.com/spring".to_string()),
            allocated_credits: allocated,
        }
    }

    #[tokio::test]
    async fn funds_campaign_and_debits_owner() {
        let (handler, store, owner_id) = setup(1_000).await;

        let campaign = handler.handle(command(owner_id, 400)).await.unwrap();

        assert_eq!(campaign.allocated_credits, 400);
        assert_eq!(campaign.spent_credits, 0);
        assert_eq!(campaign.status, CampaignStatus::Active);
        let owner = ProfileRepository::find(store.as_ref(), &owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.credits, 600);
        assert_eq!(store.transaction_count().await, 1);
    }

    #[tokio::test]
    async fn overdrawn_allocation_changes_nothing() {
        let (handler, store, owner_id) = setup(100).await;

        let err = handler.handle(command(owner_id, 101)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientCredits);
        let owner = ProfileRepository::find(store.as_ref(), &owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.credits, 100);
        assert_eq!(store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_touching_storage() {
        let (handler, store, owner_id) = setup(100).await;
        let mut cmd = command(owner_id, 10);
        cmd.name = "   ".to_string();

        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(store.transaction_count().await, 0);
    }
}
