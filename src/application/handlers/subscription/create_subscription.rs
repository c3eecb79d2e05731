//! CreateSubscriptionHandler - Starts a plan subscription and grants its first credits.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::customer::ensure_customer;
use crate::domain::billing::{PlanPrices, Subscription, SubscriptionError, SubscriptionStatus};
use crate::domain::credits::{CreditGrant, GrantOutcome, Plan};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::profile::Profile;
use crate::ports::{
    CreateSubscriptionRequest, CreditLedger, PaymentProvider, ProfileRepository,
    SubscriptionRepository,
};

#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub caller: Profile,
    pub plan_id: String,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionChangeResult {
    pub subscription: Subscription,
    /// Credits added by this request; zero when the invoice is not paid
    /// yet or was already granted.
    pub credits_granted: i64,
    pub balance: Option<i64>,
}

pub struct CreateSubscriptionHandler {
    profiles: Arc<dyn ProfileRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    ledger: Arc<dyn CreditLedger>,
    payment_provider: Arc<dyn PaymentProvider>,
    prices: PlanPrices,
}

impl CreateSubscriptionHandler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn CreditLedger>,
        payment_provider: Arc<dyn PaymentProvider>,
        prices: PlanPrices,
    ) -> Self {
        Self {
            profiles,
            subscriptions,
            ledger,
            payment_provider,
            prices,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<SubscriptionChangeResult, DomainError> {
        // 1. Resolve plan and price
        let plan = Plan::find(&cmd.plan_id)?;
        let price_id = self.prices.price_for(plan)?.to_string();
        if cmd.payment_method_id.trim().is_empty() {
            return Err(DomainError::validation(
                "payment_method_id",
                "payment_method_id is required",
            ));
        }

        // 2. One current subscription per profile
        if self
            .subscriptions
            .find_current_for_profile(&cmd.caller.id)
            .await?
            .is_some()
        {
            return Err(SubscriptionError::AlreadySubscribed(cmd.caller.id).into());
        }

        // 3. Processor customer and subscription
        let customer_id = ensure_customer(
            self.profiles.as_ref(),
            self.payment_provider.as_ref(),
            &cmd.caller,
        )
        .await?;

        let mut metadata = HashMap::new();
        metadata.insert("profile_id".to_string(), cmd.caller.id.to_string());
        metadata.insert("plan_id".to_string(), plan.id.to_string());

        let remote = self
            .payment_provider
            .create_subscription(CreateSubscriptionRequest {
                customer_id,
                price_id,
                payment_method_id: cmd.payment_method_id,
                metadata,
                idempotency_key: format!("subscribe-{}-{}", cmd.caller.id, uuid::Uuid::new_v4()),
            })
            .await?;

        // 4. Local mirror
        let subscription = Subscription::new(
            cmd.caller.id,
            plan,
            remote.id.clone(),
            remote.item_id.clone(),
            SubscriptionStatus::from_stripe(&remote.status),
            remote.current_period_end.and_then(Timestamp::from_unix),
        );
        self.subscriptions.save(&subscription).await?;

        tracing::info!(
            profile_id = %cmd.caller.id,
            plan = plan.id,
            stripe_subscription_id = %remote.id,
            status = %subscription.status,
            "subscription created"
        );

        // 5. First invoice credits
        let (credits_granted, balance) = match remote.latest_invoice.filter(|inv| inv.paid) {
            Some(invoice) => {
                let grant = CreditGrant::new(
                    cmd.caller.id,
                    plan.credits,
                    invoice.id,
                    format!("{} plan subscription", plan.name),
                )?;
                let outcome = self.ledger.grant(&grant).await?;
                let granted = match outcome {
                    GrantOutcome::Applied { .. } => plan.credits,
                    GrantOutcome::Duplicate { .. } => 0,
                };
                (granted, Some(outcome.balance()))
            }
            None => (0, None),
        };

        Ok(SubscriptionChangeResult {
            subscription,
            credits_granted,
            balance,
        })
    }
}
