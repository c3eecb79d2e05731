//! `invoice.paid` - grants the plan's credits for each paid period.
//!
//! Proration invoices from an upgrade grant the credit difference named
//! by the plan change metadata instead. The upgrade route grants the same
//! invoice when it is paid at once; the invoice id keys both.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::billing::{
    InvoiceObject, PlanChange, StripeEvent, StripeEventType, Subscription, WebhookError,
    WebhookEventHandler,
};
use crate::domain::credits::CreditGrant;
use crate::ports::{CreditLedger, SubscriptionRepository};

pub struct InvoicePaidHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    ledger: Arc<dyn CreditLedger>,
}

impl InvoicePaidHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn CreditLedger>,
    ) -> Self {
        Self {
            subscriptions,
            ledger,
        }
    }

    /// Credits and description for the invoice.
    fn grant_for(
        invoice: &InvoiceObject,
        subscription: &Subscription,
    ) -> Result<CreditGrant, WebhookError> {
        let (credits, description) = if invoice.is_plan_change() {
            let change = match invoice.subscription_metadata() {
                Some(metadata) => PlanChange::from_metadata(metadata)
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?,
                None => None,
            };
            let Some(change) = change else {
                return Err(WebhookError::Ignored(format!(
                    "invoice {} names no plan change",
                    invoice.id
                )));
            };
            (change.credits(), change.description())
        } else {
            let plan = subscription
                .plan()
                .map_err(|e| WebhookError::Database(e.to_string()))?;
            (plan.credits, format!("{} plan renewal", plan.name))
        };

        CreditGrant::new(
            subscription.profile_id,
            credits,
            invoice.id.clone(),
            description,
        )
        .map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl WebhookEventHandler for InvoicePaidHandler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![StripeEventType::InvoicePaid]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let invoice: InvoiceObject = event.object()?;

        let Some(stripe_subscription_id) = invoice.subscription.as_deref() else {
            return Err(WebhookError::Ignored(format!(
                "invoice {} is not for a subscription",
                invoice.id
            )));
        };

        let subscription = self
            .subscriptions
            .find_by_stripe_id(stripe_subscription_id)
            .await?
            .ok_or_else(|| WebhookError::SubscriptionNotFound(stripe_subscription_id.to_string()))?;

        let grant = Self::grant_for(&invoice, &subscription)?;
        let outcome = self.ledger.grant(&grant).await?;

        tracing::info!(
            invoice_id = %invoice.id,
            profile_id = %subscription.profile_id,
            credits = grant.amount,
            plan_change = invoice.is_plan_change(),
            duplicate = outcome.is_duplicate(),
            "subscription invoice paid"
        );
        Ok(())
    }
}
