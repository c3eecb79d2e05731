//! Mock payment provider for testing.
//!
//! Behaves like a well-mannered Stripe account: charges succeed, invoices
//! are paid, and a repeated idempotency key returns the original object.
//! Tests can change the outcome, inject errors and inspect the call log.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    ChangePriceRequest, CreateCustomerRequest, CreatePaymentIntentRequest,
    CreateSubscriptionRequest, Customer, PaymentError, PaymentIntent, PaymentProvider,
    ProviderInvoice, ProviderSubscription,
};

const PERIOD_SECS: i64 = 30 * 24 * 60 * 60;

/// Mock payment provider for testing.
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_method_error("create_payment_intent", PaymentError::card_declined("no"));
/// assert_eq!(mock.call_count("create_payment_intent"), 0);
/// ```
#[derive(Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    sequence: u64,

    /// Payment intents by idempotency key.
    intents: HashMap<String, PaymentIntent>,

    /// Subscriptions by id.
    subscriptions: HashMap<String, ProviderSubscription>,

    /// Subscription ids by idempotency key.
    subscription_keys: HashMap<String, String>,

    /// Price change responses by idempotency key.
    change_keys: HashMap<String, ProviderSubscription>,

    /// Status reported for new payment intents.
    intent_status: String,

    /// Whether the first invoice of a create or change is paid.
    invoice_paid: bool,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Errors returned on every call to the named method.
    method_errors: HashMap<String, PaymentError>,

    call_log: Vec<MethodCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            sequence: 0,
            intents: HashMap::new(),
            subscriptions: HashMap::new(),
            subscription_keys: HashMap::new(),
            change_keys: HashMap::new(),
            intent_status: "succeeded".to_string(),
            invoice_paid: true,
            next_error: None,
            method_errors: HashMap::new(),
            call_log: Vec::new(),
        }
    }
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{}_mock_{}", prefix, self.sequence)
    }

    fn invoice(&mut self) -> ProviderInvoice {
        let paid = self.invoice_paid;
        ProviderInvoice {
            id: self.next_id("in"),
            paid,
        }
    }
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Status for subsequently created payment intents, e.g. `requires_action`.
    pub fn set_intent_status(&self, status: impl Into<String>) {
        self.state().intent_status = status.into();
    }

    /// Whether subsequently produced invoices are paid.
    pub fn set_invoice_paid(&self, paid: bool) {
        self.state().invoice_paid = paid;
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    pub fn subscription(&self, id: &str) -> Option<ProviderSubscription> {
        self.state().subscriptions.get(id).cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

impl Clone for MockPaymentProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        self.record_call(
            "create_customer",
            vec![request.profile_id.to_string(), request.email.clone()],
        );
        self.check_error("create_customer")?;

        let id = self.state().next_id("cus");
        Ok(Customer { id })
    }

    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        self.record_call(
            "create_payment_intent",
            vec![
                request.customer_id.clone(),
                request.amount_cents.to_string(),
                request.idempotency_key.clone(),
            ],
        );
        self.check_error("create_payment_intent")?;

        let mut state = self.state();
        if let Some(existing) = state.intents.get(&request.idempotency_key) {
            return Ok(existing.clone());
        }

        let intent = PaymentIntent {
            id: format!("pi_mock_{}", request.idempotency_key),
            status: state.intent_status.clone(),
            amount: request.amount_cents,
        };
        state
            .intents
            .insert(request.idempotency_key, intent.clone());
        Ok(intent)
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<ProviderSubscription, PaymentError> {
        self.record_call(
            "create_subscription",
            vec![request.customer_id.clone(), request.price_id.clone()],
        );
        self.check_error("create_subscription")?;

        let mut state = self.state();
        if let Some(existing) = state
            .subscription_keys
            .get(&request.idempotency_key)
            .and_then(|id| state.subscriptions.get(id))
        {
            return Ok(existing.clone());
        }

        let invoice = state.invoice();
        let subscription = ProviderSubscription {
            id: state.next_id("sub"),
            item_id: Some(state.next_id("si")),
            status: if invoice.paid { "active" } else { "incomplete" }.to_string(),
            cancel_at_period_end: false,
            current_period_end: Some(chrono::Utc::now().timestamp() + PERIOD_SECS),
            latest_invoice: Some(invoice),
            metadata: request.metadata,
        };
        state
            .subscription_keys
            .insert(request.idempotency_key, subscription.id.clone());
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn change_subscription_price(
        &self,
        request: ChangePriceRequest,
    ) -> Result<ProviderSubscription, PaymentError> {
        self.record_call(
            "change_subscription_price",
            vec![
                request.subscription_id.clone(),
                request.price_id.clone(),
                request.idempotency_key.clone(),
            ],
        );
        self.check_error("change_subscription_price")?;

        let mut state = self.state();
        if let Some(existing) = state.change_keys.get(&request.idempotency_key) {
            return Ok(existing.clone());
        }

        let mut subscription = state
            .subscriptions
            .get(&request.subscription_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;

        let invoice = state.invoice();
        if !invoice.paid {
            subscription.status = "past_due".to_string();
        }
        subscription.latest_invoice = Some(invoice);
        subscription.metadata.extend(request.metadata);
        state
            .change_keys
            .insert(request.idempotency_key, subscription.clone());
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<ProviderSubscription, PaymentError> {
        self.record_call(
            "cancel_subscription",
            vec![subscription_id.to_string(), at_period_end.to_string()],
        );
        self.check_error("cancel_subscription")?;

        let mut state = self.state();
        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;

        if at_period_end {
            subscription.cancel_at_period_end = true;
        } else {
            subscription.status = "canceled".to_string();
        }
        subscription.latest_invoice = None;
        Ok(subscription.clone())
    }
}
