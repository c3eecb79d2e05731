//! GetSubscriptionHandler - The caller's current subscription, if any.

use std::sync::Arc;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, ProfileId};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub profile_id: ProfileId,
}

pub struct GetSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<Option<Subscription>, DomainError> {
        self.subscriptions
            .find_current_for_profile(&query.profile_id)
            .await
    }
}
