//! Routes verified Stripe events to the billing handlers.

use async_trait::async_trait;
use std::sync::Arc;

use super::{
    InvoicePaidHandler, InvoicePaymentFailedHandler, PaymentIntentSucceededHandler,
    SubscriptionSyncHandler,
};
use crate::domain::billing::{PlanPrices, StripeEventType, WebhookDispatcher, WebhookEventHandler};
use crate::ports::{CreditLedger, SubscriptionRepository};

pub struct BillingWebhookDispatcher {
    handlers: Vec<Box<dyn WebhookEventHandler>>,
}

impl BillingWebhookDispatcher {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn CreditLedger>,
        prices: PlanPrices,
    ) -> Self {
        Self {
            handlers: vec![
                Box::new(PaymentIntentSucceededHandler::new(ledger.clone())),
                Box::new(InvoicePaidHandler::new(subscriptions.clone(), ledger)),
                Box::new(InvoicePaymentFailedHandler::new(subscriptions.clone())),
                Box::new(SubscriptionSyncHandler::new(subscriptions, prices)),
            ],
        }
    }
}

#[async_trait]
impl WebhookDispatcher for BillingWebhookDispatcher {
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.handles().contains(event_type))
            .map(|handler| handler.as_ref())
    }
}
