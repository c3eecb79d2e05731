//! Stripe webhook event handlers.
//!
//! Each handler owns one or more event types. [`BillingWebhookDispatcher`]
//! wires them behind the idempotent processor in `domain::billing`.

mod dispatcher;
mod invoice_paid;
mod invoice_payment_failed;
mod payment_intent_succeeded;
mod subscription_sync;

pub use dispatcher::BillingWebhookDispatcher;
pub use invoice_paid::InvoicePaidHandler;
pub use invoice_payment_failed::InvoicePaymentFailedHandler;
pub use payment_intent_succeeded::PaymentIntentSucceededHandler;
pub use subscription_sync::SubscriptionSyncHandler;
