//! UpdateCampaignHandler - Owner-only partial update.

use std::sync::Arc;

use crate::domain::campaign::{Campaign, CampaignUpdate};
use crate::domain::foundation::{CampaignId, DomainError, ProfileId};
use crate::ports::CampaignRepository;

#[derive(Debug, Clone)]
pub struct UpdateCampaignCommand {
    pub owner_id: ProfileId,
    pub campaign_id: CampaignId,
    pub update: CampaignUpdate,
}

pub struct UpdateCampaignHandler {
    campaigns: Arc<dyn CampaignRepository>,
}

impl UpdateCampaignHandler {
    pub fn new(campaigns: Arc<dyn CampaignRepository>) -> Self {
        Self { campaigns }
    }

    /// Campaigns owned by someone else are reported as not found.
    pub async fn handle(&self, cmd: UpdateCampaignCommand) -> Result<Campaign, DomainError> {
        if cmd.update.is_empty() {
            return Err(DomainError::validation("body", "No fields to update"));
        }

        let campaign = self
            .campaigns
            .update_owned(&cmd.campaign_id, &cmd.owner_id, cmd.update)
            .await?;

        tracing::debug!(campaign_id = %campaign.id, status = %campaign.status, "campaign updated");
        Ok(campaign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::campaign::{CampaignStatus, NewCampaign};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::Profile;

    async fn setup() -> (UpdateCampaignHandler, Arc<InMemoryStore>, Campaign) {
        let store = Arc::new(InMemoryStore::new());
        let owner = Profile::new(ProfileId::new(), "o@example.com", None, 500);
        let owner_id = owner.id;
        store.put_profile(owner).await;
        let campaign = store
            .create_funded(NewCampaign::new(owner_id, "Launch", None, 100).unwrap())
            .await
            .unwrap();
        (UpdateCampaignHandler::new(store.clone()), store, campaign)
    }

    fn spend(campaign: &Campaign, owner_id: ProfileId, spent: i64) -> UpdateCampaignCommand {
        UpdateCampaignCommand {
            owner_id,
            campaign_id: campaign.id,
            update: CampaignUpdate {
                spent_credits: Some(spent),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn owner_can_pause_and_spend() {
        let (handler, _, campaign) = setup().await;

        let updated = handler
            .handle(UpdateCampaignCommand {
                owner_id: campaign.owner_id,
                campaign_id: campaign.id,
                update: CampaignUpdate {
                    status: Some(CampaignStatus::Paused),
                    spent_credits: Some(30),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.status, CampaignStatus::Paused);
        assert_eq!(updated.spent_credits, 30);
    }

    #[tokio::test]
    async fn overspend_is_rejected_without_mutation() {
        let (handler, store, campaign) = setup().await;

        let err = handler
            .handle(spend(&campaign, campaign.owner_id, 101))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::SpendExceedsAllocation);
        let stored = CampaignRepository::find(store.as_ref(), &campaign.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.spent_credits, 0);
    }

    #[tokio::test]
    async fn other_profiles_see_not_found() {
        let (handler, _, campaign) = setup().await;

        let err = handler
            .handle(spend(&campaign, ProfileId::new(), 10))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::CampaignNotFound);
    }

    #[tokio::test]
    async fn empty_update_is_a_validation_error() {
        let (handler, _, campaign) = setup().await;

        let err = handler
            .handle(UpdateCampaignCommand {
                owner_id: campaign.owner_id,
                campaign_id: campaign.id,
                update: CampaignUpdate::default(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
