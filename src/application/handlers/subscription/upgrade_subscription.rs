//! UpgradeSubscriptionHandler - Moves to a higher plan and grants the difference.
//!
//! The processor prorates and invoices immediately. The plan change rides
//! along as subscription metadata, so the `invoice.paid` webhook can grant
//! the difference when the proration invoice is paid later. Both paths key
//! the grant on the invoice id.
//!
//! The grant happens before the local plan is written. A request that
//! fails in between leaves the stored plan unchanged, and its retry reuses
//! the processor request through the same idempotency key.

use std::sync::Arc;

use super::create_subscription::SubscriptionChangeResult;
use crate::domain::billing::{PlanChange, PlanPrices, SubscriptionError, SubscriptionStatus};
use crate::domain::credits::{CreditGrant, GrantOutcome, Plan};
use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, Timestamp};
use crate::ports::{ChangePriceRequest, CreditLedger, PaymentProvider, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct UpgradeSubscriptionCommand {
    pub profile_id: ProfileId,
    pub plan_id: String,
}

pub struct UpgradeSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    ledger: Arc<dyn CreditLedger>,
    payment_provider: Arc<dyn PaymentProvider>,
    prices: PlanPrices,
}

impl UpgradeSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn CreditLedger>,
        payment_provider: Arc<dyn PaymentProvider>,
        prices: PlanPrices,
    ) -> Self {
        Self {
            subscriptions,
            ledger,
            payment_provider,
            prices,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpgradeSubscriptionCommand,
    ) -> Result<SubscriptionChangeResult, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_current_for_profile(&cmd.profile_id)
            .await?
            .ok_or(SubscriptionError::NotFound(cmd.profile_id))?;
        if !subscription.is_active() {
            return Err(SubscriptionError::NotActive(subscription.status.to_string()).into());
        }

        let change = PlanChange::upgrade(subscription.plan()?, Plan::find(&cmd.plan_id)?)?;
        let price_id = self.prices.price_for(change.to)?.to_string();
        let item_id = subscription.stripe_item_id.clone().ok_or_else(|| {
            DomainError::new(ErrorCode::InternalError, "Subscription has no item id")
        })?;

        let remote = self
            .payment_provider
            .change_subscription_price(ChangePriceRequest {
                subscription_id: subscription.stripe_subscription_id.clone(),
                item_id,
                price_id,
                metadata: change.to_metadata(),
                idempotency_key: upgrade_key(&subscription.stripe_subscription_id, &change),
            })
            .await?;

        let paid_invoice = remote.latest_invoice.as_ref().filter(|inv| inv.paid);
        let (credits_granted, balance) = match paid_invoice {
            Some(invoice) => {
                let grant = CreditGrant::new(
                    cmd.profile_id,
                    change.credits(),
                    invoice.id.clone(),
                    change.description(),
                )?;
                let outcome = self.ledger.grant(&grant).await?;
                let granted = match outcome {
                    GrantOutcome::Applied { .. } => change.credits(),
                    GrantOutcome::Duplicate { .. } => 0,
                };
                (granted, Some(outcome.balance()))
            }
            None => {
                tracing::info!(
                    profile_id = %cmd.profile_id,
                    "upgrade invoice not paid yet; credits follow invoice.paid"
                );
                (0, None)
            }
        };

        subscription.change_plan(change.to);
        subscription.sync(
            SubscriptionStatus::from_stripe(&remote.status),
            remote.cancel_at_period_end,
            remote.current_period_end.and_then(Timestamp::from_unix),
        );
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            profile_id = %cmd.profile_id,
            from = change.from.id,
            to = change.to.id,
            credits_granted,
            "subscription upgraded"
        );

        Ok(SubscriptionChangeResult {
            subscription,
            credits_granted,
            balance,
        })
    }
}

/// Same subscription and plans, same key.
fn upgrade_key(stripe_subscription_id: &str, change: &PlanChange) -> String {
    format!(
        "upgrade-{}-{}-{}",
        stripe_subscription_id, change.from.id, change.to.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::subscription::{
        CreateSubscriptionCommand, CreateSubscriptionHandler,
    };
    use crate::application::handlers::webhook::InvoicePaidHandler;
    use crate::domain::billing::{StripeEventBuilder, WebhookEventHandler};
    use crate::domain::profile::Profile;
    use crate::ports::{PaymentError, ProfileRepository};
    use serde_json::json;
    use std::collections::HashMap;

    fn prices() -> PlanPrices {
        PlanPrices::new(HashMap::from([
            ("starter".to_string(), "price_starter".to_string()),
            ("growth".to_string(), "price_growth".to_string()),
            ("scale".to_string(), "price_scale".to_string()),
        ]))
    }

    struct Fixture {
        handler: UpgradeSubscriptionHandler,
        store: Arc<InMemoryStore>,
        provider: Arc<MockPaymentProvider>,
        caller: Profile,
    }

    async fn subscribed(plan: &str) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockPaymentProvider::new());
        let caller = Profile::new(ProfileId::new(), "up@example.com", None, 0);
        store.put_profile(caller.clone()).await;
        CreateSubscriptionHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            provider.clone(),
            prices(),
        )
        .handle(CreateSubscriptionCommand {
            caller: caller.clone(),
            plan_id: plan.to_string(),
            payment_method_id: "pm_card_visa".to_string(),
        })
        .await
        .unwrap();

        Fixture {
            handler: UpgradeSubscriptionHandler::new(
                store.clone(),
                store.clone(),
                provider.clone(),
                prices(),
            ),
            store,
            provider,
            caller,
        }
    }

    fn upgrade(caller: &Profile, plan: &str) -> UpgradeSubscriptionCommand {
        UpgradeSubscriptionCommand {
            profile_id: caller.id,
            plan_id: plan.to_string(),
        }
    }

    #[tokio::test]
    async fn upgrade_grants_credit_difference() {
        let f = subscribed("starter").await;

        let result = f.handler.handle(upgrade(&f.caller, "scale")).await.unwrap();

        assert_eq!(result.subscription.plan_id, "scale");
        assert_eq!(result.credits_granted, 19_000);
        assert_eq!(result.balance, Some(20_000));
        let stored = f
            .store
            .find_current_for_profile(&f.caller.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.plan_id, "scale");
    }

    #[tokio::test]
    async fn same_or_lower_plan_is_invalid() {
        let f = subscribed("growth").await;

        for plan in ["growth", "starter"] {
            let err = f.handler.handle(upgrade(&f.caller, plan)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidPlanChange);
        }
        assert!(!f.provider.was_called("change_subscription_price"));
    }

    #[tokio::test]
    async fn no_subscription_is_not_found() {
        let f = subscribed("starter").await;

        let err = f
            .handler
            .handle(UpgradeSubscriptionCommand {
                profile_id: ProfileId::new(),
                plan_id: "scale".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn unpaid_proration_invoice_grants_nothing() {
        let f = subscribed("starter").await;
        f.provider.set_invoice_paid(false);

        let result = f.handler.handle(upgrade(&f.caller, "growth")).await.unwrap();

        assert_eq!(result.credits_granted, 0);
        assert_eq!(result.subscription.status, SubscriptionStatus::PastDue);
        assert_eq!(f.store.transaction_count().await, 1);
    }

    async fn balance(store: &InMemoryStore, caller: &Profile) -> i64 {
        ProfileRepository::find(store, &caller.id)
            .await
            .unwrap()
            .unwrap()
            .credits
    }

    #[tokio::test]
    async fn proration_invoice_paid_later_is_settled_by_webhook() {
        let f = subscribed("starter").await;
        f.provider.set_invoice_paid(false);

        let result = f.handler.handle(upgrade(&f.caller, "growth")).await.unwrap();
        assert_eq!(result.credits_granted, 0);
        assert_eq!(balance(&f.store, &f.caller).await, 1_000);

        let remote = f
            .provider
            .subscription(&result.subscription.stripe_subscription_id)
            .unwrap();
        let invoice_id = remote.latest_invoice.unwrap().id;
        let paid = StripeEventBuilder::new()
            .event_type("invoice.paid")
            .object(json!({
                "id": invoice_id,
                "subscription": remote.id,
                "billing_reason": "subscription_update",
                "subscription_details": { "metadata": remote.metadata },
            }))
            .build();
        let webhook = InvoicePaidHandler::new(f.store.clone(), f.store.clone());

        webhook.handle(&paid).await.unwrap();
        webhook.handle(&paid).await.unwrap();

        assert_eq!(balance(&f.store, &f.caller).await, 5_000);
    }

    #[tokio::test]
    async fn paid_upgrade_and_its_webhook_grant_once() {
        let f = subscribed("starter").await;

        let result = f.handler.handle(upgrade(&f.caller, "growth")).await.unwrap();
        assert_eq!(result.credits_granted, 4_000);

        let remote = f
            .provider
            .subscription(&result.subscription.stripe_subscription_id)
            .unwrap();
        let paid = StripeEventBuilder::new()
            .event_type("invoice.paid")
            .object(json!({
                "id": remote.latest_invoice.unwrap().id,
                "subscription": remote.id,
                "billing_reason": "subscription_update",
                "subscription_details": { "metadata": remote.metadata },
            }))
            .build();
        InvoicePaidHandler::new(f.store.clone(), f.store.clone())
            .handle(&paid)
            .await
            .unwrap();

        assert_eq!(balance(&f.store, &f.caller).await, 5_000);
    }

    #[tokio::test]
    async fn retried_upgrade_reuses_processor_request() {
        let f = subscribed("starter").await;
        f.provider
            .set_error(PaymentError::network("connection reset"));

        assert!(f.handler.handle(upgrade(&f.caller, "growth")).await.is_err());
        let stored = f
            .store
            .find_current_for_profile(&f.caller.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.plan_id, "starter");

        let result = f.handler.handle(upgrade(&f.caller, "growth")).await.unwrap();
        assert_eq!(result.credits_granted, 4_000);

        let keys: Vec<String> = f
            .provider
            .calls()
            .into_iter()
            .filter(|call| call.method == "change_subscription_price")
            .map(|call| call.args[2].clone())
            .collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
        assert_eq!(
            keys[0],
            format!("upgrade-{}-starter-growth", stored.stripe_subscription_id)
        );
    }
}
