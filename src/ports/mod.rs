//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ProfileRepository` - Profiles, roles and promotion
//! - `CampaignRepository` - Campaigns and atomic funding
//! - `CreditLedger` - Idempotent credit grants and ledger listing
//! - `VisitRepository` - Visit log and per-campaign stats
//! - `SubscriptionRepository` - Local subscription mirror
//! - `WebhookEventRepository` - Stripe webhook idempotency tracking
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - Customers, charges and subscriptions
//! - `SessionValidator` - Bearer token validation

mod campaign_repository;
mod credit_ledger;
mod payment_provider;
mod profile_repository;
mod session_validator;
mod subscription_repository;
mod visit_repository;
mod webhook_event_repository;

pub use campaign_repository::{CampaignFilter, CampaignRepository};
pub use credit_ledger::CreditLedger;
pub use payment_provider::{
    ChangePriceRequest, CreateCustomerRequest, CreatePaymentIntentRequest,
    CreateSubscriptionRequest, Customer, PaymentError, PaymentErrorCode, PaymentIntent,
    PaymentProvider, ProviderInvoice, ProviderSubscription,
};
pub use profile_repository::ProfileRepository;
pub use session_validator::SessionValidator;
pub use subscription_repository::SubscriptionRepository;
pub use visit_repository::VisitRepository;
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, WebhookResult,
};
