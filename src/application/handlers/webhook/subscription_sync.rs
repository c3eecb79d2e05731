//! `customer.subscription.updated` / `.deleted` - mirrors processor state.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::billing::{
    PlanPrices, StripeEvent, StripeEventType, SubscriptionObject, SubscriptionStatus,
    WebhookError, WebhookEventHandler,
};
use crate::domain::foundation::Timestamp;
use crate::ports::SubscriptionRepository;

pub struct SubscriptionSyncHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    prices: PlanPrices,
}

impl SubscriptionSyncHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, prices: PlanPrices) -> Self {
        Self {
            subscriptions,
            prices,
        }
    }
}

#[async_trait]
impl WebhookEventHandler for SubscriptionSyncHandler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![
            StripeEventType::CustomerSubscriptionUpdated,
            StripeEventType::CustomerSubscriptionDeleted,
        ]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let remote: SubscriptionObject = event.object()?;
        let deleted = event.parsed_type() == StripeEventType::CustomerSubscriptionDeleted;

        let Some(mut subscription) = self.subscriptions.find_by_stripe_id(&remote.id).await?
        else {
            if deleted {
                return Err(WebhookError::Ignored(format!(
                    "subscription {} is not tracked",
                    remote.id
                )));
            }
            return Err(WebhookError::SubscriptionNotFound(remote.id));
        };

        let status = if deleted {
            SubscriptionStatus::Canceled
        } else {
            SubscriptionStatus::from_stripe(&remote.status)
        };
        if let Some(plan) = remote.price_id().and_then(|p| self.prices.plan_for_price(p)) {
            if plan.id != subscription.plan_id {
                subscription.change_plan(plan);
            }
        }
        subscription.sync(
            status,
            remote.cancel_at_period_end,
            remote.period_end().and_then(Timestamp::from_unix),
        );
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            stripe_subscription_id = %remote.id,
            status = %subscription.status,
            plan = %subscription.plan_id,
            "subscription synced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::billing::{StripeEventBuilder, Subscription};
    use crate::domain::credits::Plan;
    use crate::domain::foundation::ProfileId;
    use serde_json::json;
    use std::collections::HashMap;

    async fn setup() -> (SubscriptionSyncHandler, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let subscription = Subscription::new(
            ProfileId::new(),
            Plan::find("starter").unwrap(),
            "sub_sync",
            Some("si_1".to_string()),
            SubscriptionStatus::Active,
            None,
        );
        SubscriptionRepository::save(store.as_ref(), &subscription)
            .await
            .unwrap();
        let prices = PlanPrices::new(HashMap::from([
            ("starter".to_string(), "price_starter".to_string()),
            ("scale".to_string(), "price_scale".to_string()),
        ]));
        (SubscriptionSyncHandler::new(store.clone(), prices), store)
    }

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        StripeEventBuilder::new()
            .event_type(event_type)
            .object(object)
            .build()
    }

    #[tokio::test]
    async fn update_copies_status_plan_and_period() {
        let (handler, store) = setup().await;

        handler
            .handle(&event(
                "customer.subscription.updated",
                json!({
                    "id": "sub_sync",
                    "status": "active",
                    "cancel_at_period_end": true,
                    "items": { "data": [
                        { "id": "si_1", "price": { "id": "price_scale" }, "current_period_end": 1_900_000_000 }
                    ]}
                }),
            ))
            .await
            .unwrap();

        let stored = store.find_by_stripe_id("sub_sync").await.unwrap().unwrap();
        assert_eq!(stored.plan_id, "scale");
        assert!(stored.cancel_at_period_end);
        assert_eq!(stored.current_period_end, Timestamp::from_unix(1_900_000_000));
    }

    #[tokio::test]
    async fn delete_cancels() {
        let (handler, store) = setup().await;

        handler
            .handle(&event(
                "customer.subscription.deleted",
                json!({ "id": "sub_sync", "status": "canceled" }),
            ))
            .await
            .unwrap();

        let stored = store.find_by_stripe_id("sub_sync").await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Canceled);
    }

    #[tokio::test]
    async fn untracked_subscription() {
        let (handler, _) = setup().await;
        let object = json!({ "id": "sub_unknown", "status": "active" });

        let updated = handler
            .handle(&event("customer.subscription.updated", object.clone()))
            .await;
        let deleted = handler
            .handle(&event("customer.subscription.deleted", object))
            .await;

        assert!(matches!(updated, Err(WebhookError::SubscriptionNotFound(_))));
        assert!(matches!(deleted, Err(WebhookError::Ignored(_))));
    }
}
