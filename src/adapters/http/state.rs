//! Shared application state.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::handlers::campaign::{
    CreateCampaignHandler, ListCampaignsHandler, UpdateCampaignHandler,
};
use crate::application::handlers::credits::{ListTransactionsHandler, PurchaseCreditsHandler};
use crate::application::handlers::profile::{
    EnsureProfileHandler, GetCatalogHandler, PromoteProfileHandler,
};
use crate::application::handlers::subscription::{
    CancelSubscriptionHandler, CreateSubscriptionHandler, GetSubscriptionHandler,
    UpgradeSubscriptionHandler,
};
use crate::application::handlers::visit::{
    GetAnalyticsHandler, ListVisitsHandler, RecordVisitHandler,
};
use crate::application::handlers::webhook::BillingWebhookDispatcher;
use crate::config::{AppConfig, CreditsConfig, FeatureFlags};
use crate::domain::billing::{IdempotentWebhookProcessor, PlanPrices, StripeWebhookVerifier};
use crate::ports::{
    CampaignRepository, CreditLedger, PaymentProvider, ProfileRepository, SessionValidator,
    SubscriptionRepository, VisitRepository, WebhookEventRepository,
};

/// Port implementations the API runs on.
#[derive(Clone)]
pub struct AppPorts {
    pub profiles: Arc<dyn ProfileRepository>,
    pub campaigns: Arc<dyn CampaignRepository>,
    pub ledger: Arc<dyn CreditLedger>,
    pub visits: Arc<dyn VisitRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub session_validator: Arc<dyn SessionValidator>,
}

/// Settings read by request handlers.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub webhook_secret: SecretString,
    pub require_livemode: bool,
    pub prices: PlanPrices,
    pub credits: CreditsConfig,
    pub features: FeatureFlags,
}

impl From<&AppConfig> for AppSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            webhook_secret: SecretString::new(config.payment.stripe_webhook_secret.clone()),
            require_livemode: config.payment.require_livemode,
            prices: PlanPrices::new(config.payment.price_ids.clone()),
            credits: config.credits.clone(),
            features: config.features.clone(),
        }
    }
}

/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub ports: AppPorts,
    pub prices: PlanPrices,
    pub credits: CreditsConfig,
    pub features: FeatureFlags,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub webhook_processor: Arc<IdempotentWebhookProcessor>,
}

impl AppState {
    pub fn new(ports: AppPorts, settings: AppSettings) -> Self {
        let dispatcher = BillingWebhookDispatcher::new(
            ports.subscriptions.clone(),
            ports.ledger.clone(),
            settings.prices.clone(),
        );
        let webhook_processor =
            IdempotentWebhookProcessor::new(ports.webhook_events.clone(), Arc::new(dispatcher));
        let webhook_verifier = StripeWebhookVerifier::new(settings.webhook_secret)
            .require_livemode(settings.require_livemode);

        Self {
            ports,
            prices: settings.prices,
            credits: settings.credits,
            features: settings.features,
            webhook_verifier: Arc::new(webhook_verifier),
            webhook_processor: Arc::new(webhook_processor),
        }
    }

    pub fn session_validator(&self) -> Arc<dyn SessionValidator> {
        self.ports.session_validator.clone()
    }

    // Handlers are built per request from the shared ports.

    pub fn ensure_profile_handler(&self) -> EnsureProfileHandler {
        EnsureProfileHandler::new(self.ports.profiles.clone(), self.credits.signup_credits)
    }

    pub fn promote_profile_handler(&self) -> PromoteProfileHandler {
        PromoteProfileHandler::new(
            self.ports.profiles.clone(),
            self.credits.admin_testing_credits,
            self.credits.allow_self_promotion,
        )
    }

    pub fn catalog_handler(&self) -> GetCatalogHandler {
        GetCatalogHandler::new(self.prices.priced_plan_ids())
    }

    pub fn create_campaign_handler(&self) -> CreateCampaignHandler {
        CreateCampaignHandler::new(self.ports.campaigns.clone())
    }

    pub fn update_campaign_handler(&self) -> UpdateCampaignHandler {
        UpdateCampaignHandler::new(self.ports.campaigns.clone())
    }

    pub fn list_campaigns_handler(&self) -> ListCampaignsHandler {
        ListCampaignsHandler::new(self.ports.campaigns.clone())
    }

    pub fn list_transactions_handler(&self) -> ListTransactionsHandler {
        ListTransactionsHandler::new(self.ports.ledger.clone())
    }

    pub fn purchase_credits_handler(&self) -> PurchaseCreditsHandler {
        PurchaseCreditsHandler::new(
            self.ports.profiles.clone(),
            self.ports.ledger.clone(),
            self.ports.payment_provider.clone(),
        )
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.ports.subscriptions.clone())
    }

    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(
            self.ports.profiles.clone(),
            self.ports.subscriptions.clone(),
            self.ports.ledger.clone(),
            self.ports.payment_provider.clone(),
            self.prices.clone(),
        )
    }

    pub fn upgrade_subscription_handler(&self) -> UpgradeSubscriptionHandler {
        UpgradeSubscriptionHandler::new(
            self.ports.subscriptions.clone(),
            self.ports.ledger.clone(),
            self.ports.payment_provider.clone(),
            self.prices.clone(),
        )
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(
            self.ports.subscriptions.clone(),
            self.ports.payment_provider.clone(),
        )
    }

    pub fn record_visit_handler(&self) -> RecordVisitHandler {
        RecordVisitHandler::new(self.ports.visits.clone())
    }

    pub fn list_visits_handler(&self) -> ListVisitsHandler {
        ListVisitsHandler::new(self.ports.campaigns.clone(), self.ports.visits.clone())
    }

    pub fn analytics_handler(&self) -> GetAnalyticsHandler {
        GetAnalyticsHandler::new(self.ports.visits.clone())
    }
}
