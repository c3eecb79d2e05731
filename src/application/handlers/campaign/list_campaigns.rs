//! Campaign listing queries: the caller's own, the admin view and the debug dump.

use std::sync::Arc;

use crate::domain::campaign::{Campaign, CampaignStatus};
use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::profile::Profile;
use crate::ports::{CampaignFilter, CampaignRepository};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Clone)]
pub struct ListCampaignsQuery {
    pub owner_id: ProfileId,
}

#[derive(Debug, Clone)]
pub struct ListAllCampaignsQuery {
    pub caller: Profile,
    pub status: Option<CampaignStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct ListCampaignsHandler {
    campaigns: Arc<dyn CampaignRepository>,
}

impl ListCampaignsHandler {
    pub fn new(campaigns: Arc<dyn CampaignRepository>) -> Self {
        Self { campaigns }
    }

    /// The owner's campaigns, newest first.
    pub async fn handle(&self, query: ListCampaignsQuery) -> Result<Vec<Campaign>, DomainError> {
        self.campaigns.list_by_owner(&query.owner_id).await
    }

    /// Every campaign. Admins only.
    pub async fn handle_all(
        &self,
        query: ListAllCampaignsQuery,
    ) -> Result<Vec<Campaign>, DomainError> {
        query.caller.require_admin()?;

        self.campaigns
            .list_all(CampaignFilter {
                status: query.status,
                limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
                offset: query.offset.unwrap_or(0).max(0),
            })
            .await
    }

    /// Unfiltered dump for the debug route.
    pub async fn dump(&self) -> Result<Vec<Campaign>, DomainError> {
        self.campaigns
            .list_all(CampaignFilter {
                status: None,
                limit: i64::MAX,
                offset: 0,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::campaign::NewCampaign;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::Role;

    async fn seeded() -> (ListCampaignsHandler, Profile, Profile) {
        let store = Arc::new(InMemoryStore::new());
        let alice = Profile::new(ProfileId::new(), "a@example.com", None, 1_000);
        let bob = Profile::new(ProfileId::new(), "b@example.com", None, 1_000);
        store.put_profile(alice.clone()).await;
        store.put_profile(bob.clone()).await;
        for (owner, name) in [(&alice, "A1"), (&bob, "B1"), (&alice, "A2")] {
            store
                .create_funded(NewCampaign::new(owner.id, name, None, 10).unwrap())
                .await
                .unwrap();
        }
        (ListCampaignsHandler::new(store), alice, bob)
    }

    #[tokio::test]
    async fn owner_sees_only_own_campaigns_newest_first() {
        let (handler, alice, _) = seeded().await;

        let names: Vec<_> = handler
            .handle(ListCampaignsQuery { owner_id: alice.id })
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["A2", "A1"]);
    }

    #[tokio::test]
    async fn admin_listing_requires_admin() {
        let (handler, alice, _) = seeded().await;
        let query = |caller: Profile| ListAllCampaignsQuery {
            caller,
            status: None,
            limit: None,
            offset: None,
        };

        let err = handler.handle_all(query(alice.clone())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let mut admin = alice;
        admin.role = Role::Admin;
        assert_eq!(handler.handle_all(query(admin)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn admin_listing_filters_by_status_and_pages() {
        let (handler, mut admin, _) = seeded().await;
        admin.role = Role::Admin;

        let paused = handler
            .handle_all(ListAllCampaignsQuery {
                caller: admin.clone(),
                status: Some(CampaignStatus::Paused),
                limit: None,
                offset: None,
            })
            .await
            .unwrap();
        assert!(paused.is_empty());

        let page = handler
            .handle_all(ListAllCampaignsQuery {
                caller: admin,
                status: None,
                limit: Some(2),
                offset: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "A1");
    }

    #[tokio::test]
    async fn dump_returns_everything() {
        let (handler, _, _) = seeded().await;
        assert_eq!(handler.dump().await.unwrap().len(), 3);
    }
}
