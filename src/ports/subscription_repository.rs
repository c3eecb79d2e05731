//! SubscriptionRepository port.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, ProfileId};

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Inserts a new subscription. A second non-canceled subscription for
    /// the same profile fails with `AlreadySubscribed`.
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// The profile's non-canceled subscription, if any.
    async fn find_current_for_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Subscription>, DomainError>;

    async fn find_by_stripe_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;
}
