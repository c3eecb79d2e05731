//! `payment_intent.succeeded` - grants purchased credit packages.
//!
//! The purchase route grants synchronously when the charge succeeds at
//! once. Both paths key the grant on the intent id.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::billing::{
    PaymentIntentObject, StripeEvent, StripeEventType, WebhookError, WebhookEventHandler,
};
use crate::domain::credits::CreditGrant;
use crate::domain::foundation::ProfileId;
use crate::ports::CreditLedger;

pub struct PaymentIntentSucceededHandler {
    ledger: Arc<dyn CreditLedger>,
}

impl PaymentIntentSucceededHandler {
    pub fn new(ledger: Arc<dyn CreditLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl WebhookEventHandler for PaymentIntentSucceededHandler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![StripeEventType::PaymentIntentSucceeded]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let intent: PaymentIntentObject = event.object()?;

        // Subscription invoices also produce intents; those carry no
        // profile metadata and are granted through `invoice.paid`.
        let Ok(raw_profile_id) = intent.metadata("profile_id") else {
            return Err(WebhookError::Ignored(format!(
                "payment intent {} has no profile_id metadata",
                intent.id
            )));
        };
        let profile_id: ProfileId = raw_profile_id
            .parse()
            .map_err(|_| WebhookError::ParseError(format!("invalid profile_id '{}'", raw_profile_id)))?;
        let credits: i64 = intent
            .metadata("credits")?
            .parse()
            .map_err(|_| WebhookError::ParseError("credits metadata is not a number".to_string()))?;
        let description = match intent.metadata.get("package_id") {
            Some(package) => format!("Credit package {}", package),
            None => "Credit purchase".to_string(),
        };

        let grant = CreditGrant::new(profile_id, credits, intent.id.clone(), description)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let outcome = self.ledger.grant(&grant).await?;

        tracing::info!(
            payment_intent_id = %intent.id,
            %profile_id,
            credits,
            duplicate = outcome.is_duplicate(),
            "credit purchase settled"
        );
        Ok(())
    }
}
