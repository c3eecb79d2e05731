//! CancelSubscriptionHandler - Immediate or end-of-period cancellation.

use std::sync::Arc;

use crate::domain::billing::{Subscription, SubscriptionError, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ProfileId, Timestamp};
use crate::ports::{PaymentProvider, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub profile_id: ProfileId,
    /// Cancel now instead of at the end of the paid period.
    pub immediate: bool,
}

pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            subscriptions,
            payment_provider,
        }
    }

    pub async fn handle(&self, cmd: CancelSubscriptionCommand) -> Result<Subscription, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_current_for_profile(&cmd.profile_id)
            .await?
            .ok_or(SubscriptionError::NotFound(cmd.profile_id))?;

        let remote = self
            .payment_provider
            .cancel_subscription(&subscription.stripe_subscription_id, !cmd.immediate)
            .await?;

        let status = if cmd.immediate {
            SubscriptionStatus::Canceled
        } else {
            SubscriptionStatus::from_stripe(&remote.status)
        };
        subscription.sync(
            status,
            remote.cancel_at_period_end,
            remote.current_period_end.and_then(Timestamp::from_unix),
        );
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            profile_id = %cmd.profile_id,
            immediate = cmd.immediate,
            "subscription canceled"
        );
        Ok(subscription)
    }
}
