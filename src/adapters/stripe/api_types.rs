//! Stripe REST API response types.
//!
//! Response bodies carry far more than the adapter reads; unknown fields
//! are skipped on deserialization.

use serde::Deserialize;
use std::collections::HashMap;

use crate::ports::{PaymentError, PaymentErrorCode, ProviderInvoice, ProviderSubscription};

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
    /// An id unless the request expanded it.
    #[serde(default)]
    pub latest_invoice: Option<ExpandableInvoice>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    pub id: String,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpandableInvoice {
    Object(StripeInvoice),
    Id(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub paid: Option<bool>,
}

impl StripeInvoice {
    pub fn is_paid(&self) -> bool {
        self.paid.unwrap_or(false) || self.status.as_deref() == Some("paid")
    }
}

impl From<StripeSubscription> for ProviderSubscription {
    fn from(sub: StripeSubscription) -> Self {
        let first_item = sub.items.data.first();
        let current_period_end = sub
            .current_period_end
            .or_else(|| first_item.and_then(|item| item.current_period_end));
        let item_id = first_item.map(|item| item.id.clone());

        // An unexpanded invoice id tells us nothing about payment.
        let latest_invoice = sub.latest_invoice.map(|invoice| match invoice {
            ExpandableInvoice::Object(invoice) => ProviderInvoice {
                paid: invoice.is_paid(),
                id: invoice.id,
            },
            ExpandableInvoice::Id(id) => ProviderInvoice { id, paid: false },
        });

        ProviderSubscription {
            id: sub.id,
            item_id,
            status: sub.status,
            cancel_at_period_end: sub.cancel_at_period_end,
            current_period_end,
            latest_invoice,
            metadata: sub.metadata,
        }
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StripeApiError {
    /// Maps a Stripe error onto a `PaymentError` using the HTTP status.
    pub fn into_payment_error(self, status: u16) -> PaymentError {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("Stripe returned HTTP {}", status));
        let provider_code = self.decline_code.clone().or_else(|| self.code.clone());

        let code = match status {
            402 => PaymentErrorCode::from_decline_code(provider_code.as_deref().unwrap_or("")),
            401 => PaymentErrorCode::AuthenticationError,
            404 => PaymentErrorCode::NotFound,
            429 => PaymentErrorCode::RateLimitExceeded,
            400 if self.error_type.as_deref() == Some("card_error") => {
                PaymentErrorCode::from_decline_code(provider_code.as_deref().unwrap_or(""))
            }
            400..=499 => PaymentErrorCode::InvalidRequest,
            500..=599 => PaymentErrorCode::ProviderError,
            _ => PaymentErrorCode::Unknown,
        };

        let error = PaymentError::new(code, message);
        match provider_code {
            Some(provider_code) => error.with_provider_code(provider_code),
            None => error,
        }
    }
}
