//! PurchaseCreditsHandler - One-time credit package purchase.
//!
//! The charge is confirmed synchronously. When it succeeds the credits are
//! granted keyed on the payment intent id; the `payment_intent.succeeded`
//! webhook carries the same id, so whichever arrives second is a no-op.
//! Intents that need further action are granted by the webhook alone.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::customer::ensure_customer;
use crate::domain::credits::{CreditGrant, CreditPackage, GrantOutcome};
use crate::domain::foundation::DomainError;
use crate::domain::profile::Profile;
use crate::ports::{CreatePaymentIntentRequest, CreditLedger, PaymentProvider, ProfileRepository};

const CURRENCY: &str = "usd";

#[derive(Debug, Clone)]
pub struct PurchaseCreditsCommand {
    pub caller: Profile,
    pub package_id: String,
    pub payment_method_id: String,
    /// Client-supplied retry key; one is generated when absent.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseCreditsResult {
    pub payment_intent_id: String,
    pub status: String,
    pub credits: i64,
    /// Whether this request applied the grant.
    pub granted: bool,
    pub balance: Option<i64>,
}

pub struct PurchaseCreditsHandler {
    profiles: Arc<dyn ProfileRepository>,
    ledger: Arc<dyn CreditLedger>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl PurchaseCreditsHandler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        ledger: Arc<dyn CreditLedger>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            profiles,
            ledger,
            payment_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: PurchaseCreditsCommand,
    ) -> Result<PurchaseCreditsResult, DomainError> {
        let package = CreditPackage::find(&cmd.package_id)?;
        if cmd.payment_method_id.trim().is_empty() {
            return Err(DomainError::validation(
                "payment_method_id",
                "payment_method_id is required",
            ));
        }

        let customer_id = ensure_customer(
            self.profiles.as_ref(),
            self.payment_provider.as_ref(),
            &cmd.caller,
        )
        .await?;

        let idempotency_key = cmd.idempotency_key.unwrap_or_else(|| {
            format!("purchase-{}-{}", cmd.caller.id, uuid::Uuid::new_v4())
        });

        let mut metadata = HashMap::new();
        metadata.insert("profile_id".to_string(), cmd.caller.id.to_string());
        metadata.insert("credits".to_string(), package.credits.to_string());
        metadata.insert("package_id".to_string(), package.id.to_string());

        let intent = self
            .payment_provider
            .create_payment_intent(CreatePaymentIntentRequest {
                customer_id,
                amount_cents: package.price_cents,
                currency: CURRENCY.to_string(),
                payment_method_id: cmd.payment_method_id,
                metadata,
                idempotency_key,
            })
            .await?;

        if !intent.is_succeeded() {
            tracing::info!(
                profile_id = %cmd.caller.id,
                payment_intent = %intent.id,
                status = %intent.status,
                "payment intent not yet succeeded; grant deferred to webhook"
            );
            return Ok(PurchaseCreditsResult {
                payment_intent_id: intent.id,
                status: intent.status,
                credits: package.credits,
                granted: false,
                balance: None,
            });
        }

        let grant = CreditGrant::new(
            cmd.caller.id,
            package.credits,
            intent.id.clone(),
            format!("Purchased {} credit package", package.id),
        )?;
        let outcome = self.ledger.grant(&grant).await?;

        Ok(PurchaseCreditsResult {
            payment_intent_id: intent.id,
            status: intent.status,
            credits: package.credits,
            granted: matches!(outcome, GrantOutcome::Applied { .. }),
            balance: Some(outcome.balance()),
        })
    }
}
