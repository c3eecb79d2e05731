//! Stripe webhook payloads.
//!
//! Only the fields the credit pipeline reads are modelled. Everything
//! else in the event body is ignored on deserialization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::webhook_errors::WebhookError;

/// Envelope of a Stripe webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// `evt_...`; the deduplication key.
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix seconds.
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object the event is about; its shape depends on `type`.
    pub object: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }

    /// Deserializes `data.object` into a typed object.
    pub fn object<T: DeserializeOwned>(&self) -> Result<T, WebhookError> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| {
            WebhookError::ParseError(format!("{} object: {}", self.event_type, e))
        })
    }
}

/// Event types the pipeline dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripeEventType {
    PaymentIntentSucceeded,
    InvoicePaid,
    InvoicePaymentFailed,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    Unknown,
}

impl StripeEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "invoice.paid" => Self::InvoicePaid,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::InvoicePaid => "invoice.paid",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::Unknown => "unknown",
        }
    }
}

/// `payment_intent` object.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub customer: Option<String>,
    /// Set by the purchase route: `profile_id`, `credits`, `package_id`.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentObject {
    pub fn metadata(&self, key: &'static str) -> Result<&str, WebhookError> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or(WebhookError::MissingMetadata(key))
    }
}

/// `invoice` object.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    /// `subscription_create`, `subscription_cycle`, `subscription_update`, ...
    #[serde(default)]
    pub billing_reason: Option<String>,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub subscription_details: Option<InvoiceSubscriptionDetails>,
}

/// Subscription metadata as it was when the invoice was created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceSubscriptionDetails {
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl InvoiceObject {
    /// Proration invoices produced by a plan change.
    pub fn is_plan_change(&self) -> bool {
        self.billing_reason.as_deref() == Some("subscription_update")
    }

    pub fn subscription_metadata(&self) -> Option<&HashMap<String, String>> {
        self.subscription_details
            .as_ref()
            .map(|details| &details.metadata)
    }
}

/// `subscription` object.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: SubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItemObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItemObject {
    pub id: String,
    #[serde(default)]
    pub price: Option<PriceObject>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceObject {
    pub id: String,
}

impl SubscriptionObject {
    pub fn first_item(&self) -> Option<&SubscriptionItemObject> {
        self.items.data.first()
    }

    pub fn price_id(&self) -> Option<&str> {
        self.first_item()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }

    /// Newer API versions report the period end per item.
    pub fn period_end(&self) -> Option<i64> {
        self.current_period_end
            .or_else(|| self.first_item().and_then(|item| item.current_period_end))
    }
}

/// Builder for test events.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "payment_intent.succeeded".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let raw = json!({
            "id": "evt_1",
            "type": "invoice.paid",
            "created": 1_700_000_000,
            "data": { "object": { "id": "in_1" } }
        });
        let event: StripeEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.parsed_type(), StripeEventType::InvoicePaid);
        assert!(!event.is_live());
        assert!(event.api_version.is_none());
    }

    #[test]
    fn event_type_parse_and_as_str_agree() {
        for t in [
            StripeEventType::PaymentIntentSucceeded,
            StripeEventType::InvoicePaid,
            StripeEventType::InvoicePaymentFailed,
            StripeEventType::CustomerSubscriptionUpdated,
            StripeEventType::CustomerSubscriptionDeleted,
        ] {
            assert_eq!(StripeEventType::parse(t.as_str()), t);
        }
        assert_eq!(
            StripeEventType::parse("charge.refunded"),
            StripeEventType::Unknown
        );
    }

    #[test]
    fn payment_intent_metadata_lookup() {
        let event = StripeEventBuilder::new()
            .object(json!({
                "id": "pi_1",
                "status": "succeeded",
                "amount": 1000,
                "metadata": { "profile_id": "abc", "credits": "" }
            }))
            .build();
        let intent: PaymentIntentObject = event.object().unwrap();
        assert_eq!(intent.metadata("profile_id").unwrap(), "abc");
        assert!(matches!(
            intent.metadata("credits"),
            Err(WebhookError::MissingMetadata("credits"))
        ));
    }

    #[test]
    fn wrong_object_shape_is_a_parse_error() {
        let event = StripeEventBuilder::new().object(json!({ "id": 5 })).build();
        let result: Result<PaymentIntentObject, _> = event.object();
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn invoice_plan_change_detection() {
        let invoice: InvoiceObject = serde_json::from_value(json!({
            "id": "in_1",
            "subscription": "sub_1",
            "billing_reason": "subscription_update"
        }))
        .unwrap();
        assert!(invoice.is_plan_change());
        assert_eq!(invoice.amount_paid, 0);
        assert!(invoice.subscription_metadata().is_none());
    }

    #[test]
    fn invoice_carries_subscription_metadata() {
        let invoice: InvoiceObject = serde_json::from_value(json!({
            "id": "in_2",
            "subscription": "sub_1",
            "billing_reason": "subscription_update",
            "subscription_details": { "metadata": { "upgrade_to": "growth" } }
        }))
        .unwrap();
        let metadata = invoice.subscription_metadata().unwrap();
        assert_eq!(metadata.get("upgrade_to").map(String::as_str), Some("growth"));
    }

    #[test]
    fn subscription_period_end_falls_back_to_item() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "items": { "data": [
                { "id": "si_1", "price": { "id": "price_growth" }, "current_period_end": 1_800_000_000 }
            ]}
        }))
        .unwrap();
        assert_eq!(sub.period_end(), Some(1_800_000_000));
        assert_eq!(sub.price_id(), Some("price_growth"));
        assert!(!sub.cancel_at_period_end);
    }
}
