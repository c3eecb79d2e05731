//! ListVisitsHandler - Visit log of one campaign for its owner or an admin.

use std::sync::Arc;

use crate::domain::campaign::CampaignError;
use crate::domain::foundation::{CampaignId, DomainError};
use crate::domain::profile::Profile;
use crate::domain::visit::Visit;
use crate::ports::{CampaignRepository, VisitRepository};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1_000;

#[derive(Debug, Clone)]
pub struct ListVisitsQuery {
    pub caller: Profile,
    pub campaign_id: CampaignId,
    pub limit: Option<i64>,
}

pub struct ListVisitsHandler {
    campaigns: Arc<dyn CampaignRepository>,
    visits: Arc<dyn VisitRepository>,
}

impl ListVisitsHandler {
    pub fn new(campaigns: Arc<dyn CampaignRepository>, visits: Arc<dyn VisitRepository>) -> Self {
        Self { campaigns, visits }
    }

    pub async fn handle(&self, query: ListVisitsQuery) -> Result<Vec<Visit>, DomainError> {
        let not_found = || DomainError::from(CampaignError::NotFound(query.campaign_id));

        let campaign = self
            .campaigns
            .find(&query.campaign_id)
            .await?
            .ok_or_else(not_found)?;
        if !campaign.is_owned_by(&query.caller.id) && !query.caller.is_admin() {
            return Err(not_found());
        }

        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.visits.list_for_campaign(&campaign.id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::campaign::{Campaign, NewCampaign};
    use crate::domain::foundation::{ErrorCode, ProfileId};
    use crate::domain::profile::Role;

    async fn setup() -> (ListVisitsHandler, Profile, Campaign) {
        let store = Arc::new(InMemoryStore::new());
        let owner = Profile::new(ProfileId::new(), "o@example.com", None, 10);
        store.put_profile(owner.clone()).await;
        let campaign = store
            .create_funded(NewCampaign::new(owner.id, "C", None, 10).unwrap())
            .await
            .unwrap();
        for visitor in ["a", "b", "a"] {
            store
                .record(&Visit::new(campaign.id, visitor).unwrap())
                .await
                .unwrap();
        }
        (
            ListVisitsHandler::new(store.clone(), store),
            owner,
            campaign,
        )
    }

    #[tokio::test]
    async fn owner_lists_visits() {
        let (handler, owner, campaign) = setup().await;

        let visits = handler
            .handle(ListVisitsQuery {
                caller: owner,
                campaign_id: campaign.id,
                limit: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(visits.len(), 2);
    }

    #[tokio::test]
    async fn admin_lists_any_campaign() {
        let (handler, _, campaign) = setup().await;
        let mut admin = Profile::new(ProfileId::new(), "admin@example.com", None, 0);
        admin.role = Role::Admin;

        let visits = handler
            .handle(ListVisitsQuery {
                caller: admin,
                campaign_id: campaign.id,
                limit: None,
            })
            .await
            .unwrap();

        assert_eq!(visits.len(), 3);
    }

    #[tokio::test]
    async fn stranger_sees_not_found() {
        let (handler, _, campaign) = setup().await;
        let stranger = Profile::new(ProfileId::new(), "s@example.com", None, 0);

        let err = handler
            .handle(ListVisitsQuery {
                caller: stranger,
                campaign_id: campaign.id,
                limit: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::CampaignNotFound);
    }
}
