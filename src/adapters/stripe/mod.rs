//! Stripe payment provider adapter.
//!
//! `StripePaymentAdapter` implements the `PaymentProvider` port against the
//! Stripe REST API. Webhook signature verification lives in the billing
//! domain, since it needs no network access.
//!
//! # Configuration
//!
//! - `CAMPAIGN_CREDITS__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `CAMPAIGN_CREDITS__PAYMENT__API_BASE`: optional override, e.g. a local
//!   stripe-mock

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeErrorResponse, StripeSubscription};
pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
