//! `invoice.payment_failed` - marks the subscription past due.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::billing::{
    InvoiceObject, StripeEvent, StripeEventType, SubscriptionStatus, WebhookError,
    WebhookEventHandler,
};
use crate::ports::SubscriptionRepository;

pub struct InvoicePaymentFailedHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl InvoicePaymentFailedHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }
}

#[async_trait]
impl WebhookEventHandler for InvoicePaymentFailedHandler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![StripeEventType::InvoicePaymentFailed]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let invoice: InvoiceObject = event.object()?;
        let Some(stripe_subscription_id) = invoice.subscription.as_deref() else {
            return Err(WebhookError::Ignored(format!(
                "invoice {} is not for a subscription",
                invoice.id
            )));
        };

        let Some(mut subscription) = self
            .subscriptions
            .find_by_stripe_id(stripe_subscription_id)
            .await?
        else {
            return Err(WebhookError::SubscriptionNotFound(
                stripe_subscription_id.to_string(),
            ));
        };

        let cancel_at_period_end = subscription.cancel_at_period_end;
        subscription.sync(SubscriptionStatus::PastDue, cancel_at_period_end, None);
        self.subscriptions.update(&subscription).await?;

        tracing::warn!(
            invoice_id = %invoice.id,
            profile_id = %subscription.profile_id,
            "subscription payment failed"
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

    #[tokio::test]
    async fn failed_renewal_marks_past_due() {
        let store = Arc::new(InMemoryStore::new());
        let subscription = Subscription::new(
            ProfileId::new(),
            Plan::find("starter").unwrap(),
            "sub_9",
            None,
            SubscriptionStatus::Active,
            None,
        );
        SubscriptionRepository::save(store.as_ref(), &subscription)
            .await
            .unwrap();
        let handler = InvoicePaymentFailedHandler::new(store.clone());

        handler
            .handle(
                &StripeEventBuilder::new()
                    .event_type("invoice.payment_failed")
                    .object(json!({ "id": "in_9", "subscription": "sub_9" }))
                    .build(),
            )
            .await
            .unwrap();

        let stored = store.find_by_stripe_id("sub_9").await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::PastDue);
    }
}
