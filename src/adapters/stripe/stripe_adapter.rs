//! Stripe payment provider adapter.
//!
//! Talks to the Stripe REST API with form-encoded requests. Charge and
//! subscription calls send an `Idempotency-Key` header, so a retried HTTP
//! request returns the original object instead of charging twice.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::ports::{
    ChangePriceRequest, CreateCustomerRequest, CreatePaymentIntentRequest,
    CreateSubscriptionRequest, Customer, PaymentError, PaymentErrorCode, PaymentIntent,
    PaymentProvider, ProviderSubscription,
};

use super::api_types::{
    StripeCustomer, StripeErrorResponse, StripePaymentIntent, StripeSubscription,
};

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    api_key: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Points the adapter at another host, e.g. stripe-mock.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&PaymentConfig> for StripeConfig {
    fn from(config: &PaymentConfig) -> Self {
        StripeConfig::new(config.stripe_api_key.clone())
            .with_base_url(config.api_base.clone())
            .with_timeout(config.timeout())
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// POSTs `params` and decodes the response body.
    async fn post<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, PaymentError> {
        let mut request = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params);

        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }

        self.send(operation, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PaymentError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Stripe request failed");
            PaymentError::network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match serde_json::from_str::<StripeErrorResponse>(&body) {
                Ok(parsed) => parsed.error.into_payment_error(status.as_u16()),
                Err(_) => PaymentError::new(
                    PaymentErrorCode::ProviderError,
                    format!("Stripe API error: HTTP {}", status.as_u16()),
                ),
            };
            tracing::error!(
                operation,
                status = status.as_u16(),
                code = %error.code,
                provider_code = ?error.provider_code,
                "Stripe API call failed"
            );
            return Err(error);
        }

        response.json::<T>().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })
    }
}

fn metadata_params(
    params: &mut Vec<(String, String)>,
    metadata: &std::collections::HashMap<String, String>,
) {
    let mut entries: Vec<_> = metadata.iter().collect();
    entries.sort();
    for (key, value) in entries {
        params.push((format!("metadata[{}]", key), value.clone()));
    }
}

pub(crate) fn payment_intent_params(request: &CreatePaymentIntentRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("amount".to_string(), request.amount_cents.to_string()),
        ("currency".to_string(), request.currency.to_lowercase()),
        ("customer".to_string(), request.customer_id.clone()),
        ("payment_method".to_string(), request.payment_method_id.clone()),
        ("confirm".to_string(), "true".to_string()),
        ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        (
            "automatic_payment_methods[allow_redirects]".to_string(),
            "never".to_string(),
        ),
    ];
    metadata_params(&mut params, &request.metadata);
    params
}

pub(crate) fn subscription_params(request: &CreateSubscriptionRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("customer".to_string(), request.customer_id.clone()),
        ("items[0][price]".to_string(), request.price_id.clone()),
        (
            "default_payment_method".to_string(),
            request.payment_method_id.clone(),
        ),
        ("payment_behavior".to_string(), "error_if_incomplete".to_string()),
        ("expand[]".to_string(), "latest_invoice".to_string()),
    ];
    metadata_params(&mut params, &request.metadata);
    params
}

/// An unpaid proration invoice leaves the change applied and the invoice
/// open; `invoice.paid` settles it later.
pub(crate) fn change_price_params(request: &ChangePriceRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("items[0][id]".to_string(), request.item_id.clone()),
        ("items[0][price]".to_string(), request.price_id.clone()),
        ("proration_behavior".to_string(), "always_invoice".to_string()),
        ("payment_behavior".to_string(), "allow_incomplete".to_string()),
        ("expand[]".to_string(), "latest_invoice".to_string()),
    ];
    metadata_params(&mut params, &request.metadata);
    params
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let mut params = vec![
            ("email".to_string(), request.email.clone()),
            (
                "metadata[profile_id]".to_string(),
                request.profile_id.to_string(),
            ),
        ];
        if let Some(name) = &request.name {
            params.push(("name".to_string(), name.clone()));
        }

        // Keyed on the profile so a retried first purchase reuses the customer.
        let key = format!("customer-{}", request.profile_id);
        let customer: StripeCustomer = self
            .post("create_customer", "/v1/customers", &params, Some(&key))
            .await?;

        tracing::info!(profile_id = %request.profile_id, customer_id = %customer.id, "Stripe customer created");
        Ok(Customer { id: customer.id })
    }

    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let params = payment_intent_params(&request);
        let intent: StripePaymentIntent = self
            .post(
                "create_payment_intent",
                "/v1/payment_intents",
                &params,
                Some(&request.idempotency_key),
            )
            .await?;

        Ok(PaymentIntent {
            id: intent.id,
            status: intent.status,
            amount: intent.amount,
        })
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<ProviderSubscription, PaymentError> {
        let attach = vec![("customer".to_string(), request.customer_id.clone())];
        let attach_path = format!("/v1/payment_methods/{}/attach", request.payment_method_id);
        let attach_key = format!("{}-attach", request.idempotency_key);
        let _: serde_json::Value = self
            .post("attach_payment_method", &attach_path, &attach, Some(&attach_key))
            .await?;

        let params = subscription_params(&request);
        let subscription: StripeSubscription = self
            .post(
                "create_subscription",
                "/v1/subscriptions",
                &params,
                Some(&request.idempotency_key),
            )
            .await?;

        Ok(subscription.into())
    }

    async fn change_subscription_price(
        &self,
        request: ChangePriceRequest,
    ) -> Result<ProviderSubscription, PaymentError> {
        let path = format!("/v1/subscriptions/{}", request.subscription_id);
        let params = change_price_params(&request);
        let subscription: StripeSubscription = self
            .post(
                "change_subscription_price",
                &path,
                &params,
                Some(&request.idempotency_key),
            )
            .await?;

        Ok(subscription.into())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<ProviderSubscription, PaymentError> {
        let path = format!("/v1/subscriptions/{}", subscription_id);

        let subscription: StripeSubscription = if at_period_end {
            let params = vec![("cancel_at_period_end".to_string(), "true".to_string())];
            self.post("cancel_subscription", &path, &params, None).await?
        } else {
            let request = self
                .http_client
                .delete(self.url(&path))
                .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None);
            self.send("cancel_subscription", request).await?
        };

        Ok(subscription.into())
    }
}
