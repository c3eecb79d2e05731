//! Billing - subscriptions and the Stripe webhook pipeline.
//!
//! Webhooks pass through three stages: [`StripeWebhookVerifier`] checks
//! the signature and parses the event, [`IdempotentWebhookProcessor`]
//! deduplicates on event id, and a [`WebhookDispatcher`] routes the event
//! to the handler for its type.

mod errors;
mod plan_change;
mod plan_prices;
mod stripe_event;
mod subscription;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use stripe_event::{
    InvoiceObject, InvoiceSubscriptionDetails, PaymentIntentObject, PriceObject, StripeEvent,
    StripeEventData, StripeEventType, SubscriptionItemObject, SubscriptionItems,
    SubscriptionObject,
};
#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use errors::SubscriptionError;
pub use plan_change::PlanChange;
pub use plan_prices::PlanPrices;
pub use subscription::{Subscription, SubscriptionStatus};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{IdempotentWebhookProcessor, WebhookDispatcher, WebhookEventHandler};
pub use webhook_verifier::{signature_header, SignatureHeader, StripeWebhookVerifier};
