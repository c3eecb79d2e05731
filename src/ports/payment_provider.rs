//! Payment provider port for external payment processing.
//!
//! Implementations talk to the processor (Stripe in production). Every
//! charge-creating call carries an idempotency key so a retried request
//! never charges twice.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Returns the provider's customer ID.
    async fn create_customer(&self, request: CreateCustomerRequest)
        -> Result<Customer, PaymentError>;

    /// Creates and confirms a one-time charge.
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Subscribes the customer to a price and attempts the first invoice.
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<ProviderSubscription, PaymentError>;

    /// Swaps the price on the subscription item and invoices the proration
    /// immediately.
    async fn change_subscription_price(
        &self,
        request: ChangePriceRequest,
    ) -> Result<ProviderSubscription, PaymentError>;

    /// With `at_period_end` the subscription stays active until the period
    /// ends; otherwise it is canceled now.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<ProviderSubscription, PaymentError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Stored as metadata on the customer.
    pub profile_id: ProfileId,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub customer_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub payment_method_id: String,
    pub metadata: HashMap<String, String>,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Processor status, e.g. `succeeded`, `requires_action`, `processing`.
    pub status: String,
    pub amount: i64,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub payment_method_id: String,
    pub metadata: HashMap<String, String>,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePriceRequest {
    pub subscription_id: String,
    pub item_id: String,
    pub price_id: String,
    /// Merged into the subscription's metadata.
    pub metadata: HashMap<String, String>,
    pub idempotency_key: String,
}

/// Subscription as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    /// First subscription item; plan changes target it.
    pub item_id: Option<String>,
    pub status: String,
    pub cancel_at_period_end: bool,
    /// Unix seconds.
    pub current_period_end: Option<i64>,
    pub latest_invoice: Option<ProviderInvoice>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInvoice {
    pub id: String,
    pub paid: bool,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Processor's own error code, e.g. `card_declined`.
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn card_declined(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::CardDeclined, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::CardDeclined
            | PaymentErrorCode::InsufficientFunds
            | PaymentErrorCode::CardExpired
            | PaymentErrorCode::InvalidCard => ErrorCode::PaymentRequired,
            PaymentErrorCode::NotFound | PaymentErrorCode::InvalidRequest => {
                ErrorCode::PaymentFailed
            }
            _ => ErrorCode::ExternalServiceError,
        };

        let mut domain = DomainError::new(code, err.message);
        if let Some(provider_code) = err.provider_code {
            domain = domain.with_detail("provider_code", provider_code);
        }
        domain
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    CardDeclined,
    InsufficientFunds,
    CardExpired,
    InvalidCard,
    NotFound,
    /// The processor rejected the parameters.
    InvalidRequest,
    RateLimitExceeded,
    /// Processor-side 5xx.
    ProviderError,
    Unknown,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderError
        )
    }

    /// Maps a processor decline code onto the local set.
    pub fn from_decline_code(code: &str) -> Self {
        match code {
            "insufficient_funds" => PaymentErrorCode::InsufficientFunds,
            "expired_card" => PaymentErrorCode::CardExpired,
            "incorrect_number" | "invalid_number" | "incorrect_cvc" | "invalid_cvc"
            | "invalid_expiry_month" | "invalid_expiry_year" => PaymentErrorCode::InvalidCard,
            _ => PaymentErrorCode::CardDeclined,
        }
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::CardDeclined => "card_declined",
            PaymentErrorCode::InsufficientFunds => "insufficient_funds",
            PaymentErrorCode::CardExpired => "card_expired",
            PaymentErrorCode::InvalidCard => "invalid_card",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
