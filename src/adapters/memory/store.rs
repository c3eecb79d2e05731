//! In-Memory Store Adapter
//!
//! Implements every repository port over one shared state guarded by a
//! single `RwLock`. Each mutation holds the write lock for its whole
//! duration, which gives the same all-or-nothing behavior the Postgres
//! adapters get from transactions.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::Subscription;
use crate::domain::campaign::{Campaign, CampaignError, CampaignUpdate, NewCampaign};
use crate::domain::credits::{CreditGrant, CreditTransaction, GrantOutcome};
use crate::domain::foundation::{CampaignId, DomainError, ErrorCode, ProfileId};
use crate::domain::profile::{profile_not_found, Profile, Role};
use crate::domain::visit::{CampaignStats, Visit};
use crate::ports::{
    CampaignFilter, CampaignRepository, CreditLedger, ProfileRepository, SaveResult,
    SubscriptionRepository, VisitRepository, WebhookEventRecord, WebhookEventRepository,
    WebhookOutcome,
};

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<ProfileId, Profile>,
    /// Insertion order; iterate in reverse for newest first.
    campaigns: Vec<Campaign>,
    transactions: Vec<CreditTransaction>,
    visits: Vec<Visit>,
    subscriptions: Vec<Subscription>,
    webhook_events: HashMap<String, WebhookEventRecord>,
}

/// Shared in-memory backing store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile. Test setup helper.
    pub async fn put_profile(&self, profile: Profile) {
        self.state.write().await.profiles.insert(profile.id, profile);
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }

    pub async fn visit_count(&self) -> usize {
        self.state.read().await.visits.len()
    }
}

fn campaign_not_found(id: &CampaignId) -> DomainError {
    CampaignError::NotFound(*id).into()
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find(&self, id: &ProfileId) -> Result<Option<Profile>, DomainError> {
        Ok(self.state.read().await.profiles.get(id).cloned())
    }

    async fn ensure(&self, profile: &Profile) -> Result<Profile, DomainError> {
        let mut state = self.state.write().await;
        Ok(state
            .profiles
            .entry(profile.id)
            .or_insert_with(|| profile.clone())
            .clone())
    }

    async fn set_stripe_customer_id(
        &self,
        id: &ProfileId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let profile = state.profiles.get_mut(id).ok_or_else(|| profile_not_found(id))?;
        profile.stripe_customer_id = Some(customer_id.to_string());
        Ok(())
    }

    async fn promote_to_admin(
        &self,
        id: &ProfileId,
        credits: i64,
    ) -> Result<Profile, DomainError> {
        let mut state = self.state.write().await;
        let profile = state.profiles.get_mut(id).ok_or_else(|| profile_not_found(id))?;

        let delta = credits - profile.credits;
        profile.role = Role::Admin;
        profile.credits = credits;
        let promoted = profile.clone();

        if delta != 0 {
            state.transactions.push(CreditTransaction::adjustment(
                *id,
                delta,
                "Admin promotion testing credits",
            ));
        }
        Ok(promoted)
    }
}

#[async_trait]
impl CampaignRepository for InMemoryStore {
    async fn create_funded(&self, new: NewCampaign) -> Result<Campaign, DomainError> {
        let mut state = self.state.write().await;
        let owner = new.owner_id;
        let available = state
            .profiles
            .get(&owner)
            .map(|p| p.credits)
            .ok_or_else(|| profile_not_found(&owner))?;

        let campaign = Campaign::fund(new, available)?;

        if let Some(profile) = state.profiles.get_mut(&owner) {
            profile.credits -= campaign.allocated_credits;
        }
        state.transactions.push(CreditTransaction::spend(
            owner,
            campaign.id,
            campaign.allocated_credits,
            &campaign.name,
        ));
        state.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn find(&self, id: &CampaignId) -> Result<Option<Campaign>, DomainError> {
        let state = self.state.read().await;
        Ok(state.campaigns.iter().find(|c| &c.id == id).cloned())
    }

    async fn update_owned(
        &self,
        id: &CampaignId,
        owner: &ProfileId,
        update: CampaignUpdate,
    ) -> Result<Campaign, DomainError> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .iter_mut()
            .find(|c| &c.id == id && c.is_owned_by(owner))
            .ok_or_else(|| campaign_not_found(id))?;

        campaign.apply(update)?;
        Ok(campaign.clone())
    }

    async fn list_by_owner(&self, owner: &ProfileId) -> Result<Vec<Campaign>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .campaigns
            .iter()
            .rev()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn list_all(&self, filter: CampaignFilter) -> Result<Vec<Campaign>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .campaigns
            .iter()
            .rev()
            .filter(|c| filter.status.map_or(true, |status| c.status == status))
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CreditLedger for InMemoryStore {
    async fn grant(&self, grant: &CreditGrant) -> Result<GrantOutcome, DomainError> {
        let mut state = self.state.write().await;
        let balance = state
            .profiles
            .get(&grant.profile_id)
            .map(|p| p.credits)
            .ok_or_else(|| profile_not_found(&grant.profile_id))?;

        let duplicate = state
            .transactions
            .iter()
            .any(|tx| tx.payment_reference.as_deref() == Some(grant.payment_reference.as_str()));
        if duplicate {
            return Ok(GrantOutcome::Duplicate { balance });
        }

        let transaction = grant.to_transaction();
        state.transactions.push(transaction.clone());
        let profile = state
            .profiles
            .get_mut(&grant.profile_id)
            .ok_or_else(|| profile_not_found(&grant.profile_id))?;
        profile.credits += grant.amount;

        Ok(GrantOutcome::Applied {
            transaction,
            balance: profile.credits,
        })
    }

    async fn list_for_profile(
        &self,
        profile_id: &ProfileId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CreditTransaction>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|tx| &tx.profile_id == profile_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VisitRepository for InMemoryStore {
    async fn record(&self, visit: &Visit) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.campaigns.iter().any(|c| c.id == visit.campaign_id) {
            return Err(campaign_not_found(&visit.campaign_id));
        }
        state.visits.push(visit.clone());
        Ok(())
    }

    async fn list_for_campaign(
        &self,
        campaign_id: &CampaignId,
        limit: i64,
    ) -> Result<Vec<Visit>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .visits
            .iter()
            .rev()
            .filter(|v| &v.campaign_id == campaign_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn stats_for_owner(&self, owner: &ProfileId) -> Result<Vec<CampaignStats>, DomainError> {
        let state = self.state.read().await;
        let stats = state
            .campaigns
            .iter()
            .rev()
            .filter(|c| c.is_owned_by(owner))
            .map(|campaign| {
                let visits: Vec<&Visit> = state
                    .visits
                    .iter()
                    .filter(|v| v.campaign_id == campaign.id)
                    .collect();
                let unique: HashSet<&str> = visits.iter().map(|v| v.visitor_id.as_str()).collect();
                CampaignStats {
                    campaign_id: campaign.id,
                    name: campaign.name.clone(),
                    status: campaign.status,
                    allocated_credits: campaign.allocated_credits,
                    spent_credits: campaign.spent_credits,
                    total_visits: visits.len() as i64,
                    unique_visitors: unique.len() as i64,
                }
            })
            .collect();
        Ok(stats)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let has_current = state
            .subscriptions
            .iter()
            .any(|s| s.profile_id == subscription.profile_id && s.is_current());
        if subscription.is_current() && has_current {
            return Err(DomainError::new(
                ErrorCode::AlreadySubscribed,
                "Profile already has an active subscription",
            ));
        }
        state.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let existing = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    format!("Subscription not found: {}", subscription.id),
                )
            })?;
        *existing = subscription.clone();
        Ok(())
    }

    async fn find_current_for_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Subscription>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .rev()
            .find(|s| &s.profile_id == profile_id && s.is_current())
            .cloned())
    }

    async fn find_by_stripe_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| s.stripe_subscription_id == stripe_subscription_id)
            .cloned())
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryStore {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.state.read().await.webhook_events.get(event_id).cloned())
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut state = self.state.write().await;
        match state.webhook_events.get(&record.event_id) {
            Some(existing) if existing.result != WebhookOutcome::Failed => {
                Ok(SaveResult::AlreadyExists)
            }
            _ => {
                state.webhook_events.insert(record.event_id.clone(), record);
                Ok(SaveResult::Inserted)
            }
        }
    }
}
